use serde::Deserialize;

/// Mobile browser identity; the mobile post variant is what gets parsed
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";

/// Blog search endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://openapi.naver.com/v1/search/blog";

/// Main configuration structure for Blog-Harvest
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Batch scheduling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Upper bound on concurrent fetch+assemble units
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: u32,

    /// Lower bound of the per-request pacing delay (milliseconds)
    #[serde(rename = "delay-min-ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the per-request pacing delay (milliseconds)
    #[serde(rename = "delay-max-ms")]
    pub delay_max_ms: u64,

    /// Per-fetch timeout (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            delay_min_ms: 500,
            delay_max_ms: 1500,
            fetch_timeout_secs: 10,
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 5,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the CSV file is written to
    pub directory: String,

    /// Fixed file name; a timestamped name is generated when unset
    pub filename: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            filename: None,
        }
    }
}

/// Keyword search configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,

    /// Number of results requested per search
    pub display: u32,

    #[serde(rename = "client-id")]
    pub client_id: Option<String>,

    #[serde(rename = "client-secret")]
    pub client_secret: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            display: 8,
            client_id: None,
            client_secret: None,
        }
    }
}

/// Log file configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for per-run log files; console only when unset
    pub directory: Option<String>,
}
