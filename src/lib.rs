//! Blog-Harvest: metadata extraction for rendered blog posts
//!
//! This crate fetches individual blog post pages, extracts body text and
//! engagement counters through ordered selector fallback chains, and exports
//! the assembled records as a spreadsheet-friendly CSV file.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod identifier;
pub mod listing;
pub mod logging;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Blog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Identifier error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Listing error: {0}")]
    Listing(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ItemState,
        to: state::ItemState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing search credentials: {0}")]
    MissingCredentials(String),
}

/// Identifier-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Blog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for identifier operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchOutcome, BatchResult, Coordinator, DocumentFetcher, HttpFetcher};
pub use extract::{assemble, FieldResult, Record, RenderedDocument};
pub use identifier::PostIdentifier;
pub use output::CsvSink;
pub use state::ItemState;
