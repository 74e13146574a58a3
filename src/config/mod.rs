//! Configuration module for Blog-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so running without a file is valid.
//!
//! # Example
//!
//! ```no_run
//! use blog_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Workers: {}", config.crawler.max_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, LoggingConfig, OutputConfig, SearchConfig,
    DEFAULT_SEARCH_ENDPOINT, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, parse_config, CLIENT_ID_ENV, CLIENT_SECRET_ENV};
pub use validation::validate;
