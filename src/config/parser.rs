use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable that overrides `[search] client-id`
pub const CLIENT_ID_ENV: &str = "NAVER_CLIENT_ID";

/// Environment variable that overrides `[search] client-secret`
pub const CLIENT_SECRET_ENV: &str = "NAVER_CLIENT_SECRET";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use blog_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Concurrency: {}", config.crawler.max_concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Fills search credentials from the environment when they are set there
///
/// Environment values take precedence over the file so secrets can stay out
/// of checked-in configuration.
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(id) = non_empty_env(CLIENT_ID_ENV) {
        config.search.client_id = Some(id);
    }
    if let Some(secret) = non_empty_env(CLIENT_SECRET_ENV) {
        config.search.client_secret = Some(secret);
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
