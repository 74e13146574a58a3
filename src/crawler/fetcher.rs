//! Document fetching
//!
//! This module defines the `DocumentFetcher` seam the coordinator talks to
//! and the HTTP implementation used in production:
//! - Building an HTTP client with the configured mobile user agent
//! - GET requests for the mobile post variant
//! - Error classification into per-identifier fetch failures

use crate::config::FetcherConfig;
use crate::identifier::PostIdentifier;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Markup returned for one post
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Rendered page markup
    pub body: String,

    /// Time spent fetching
    pub elapsed: Duration,
}

/// Failure to retrieve one post
///
/// Terminal for that identifier only; the rest of the batch carries on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status_code} for {identifier} ({elapsed:?})")]
    Http {
        identifier: String,
        status_code: u16,
        elapsed: Duration,
    },

    #[error("Expected HTML for {identifier}, got {content_type} ({elapsed:?})")]
    ContentMismatch {
        identifier: String,
        content_type: String,
        elapsed: Duration,
    },

    #[error("Network error for {identifier}: {cause} ({elapsed:?})")]
    Network {
        identifier: String,
        cause: String,
        elapsed: Duration,
    },

    #[error("Timed out fetching {identifier} ({elapsed:?})")]
    Timeout {
        identifier: String,
        elapsed: Duration,
    },

    #[error("Failed to read body of {identifier}: {cause} ({elapsed:?})")]
    Body {
        identifier: String,
        cause: String,
        elapsed: Duration,
    },
}

impl FetchError {
    /// The identifier the fetch was for
    pub fn identifier(&self) -> &str {
        match self {
            Self::Http { identifier, .. }
            | Self::ContentMismatch { identifier, .. }
            | Self::Network { identifier, .. }
            | Self::Timeout { identifier, .. }
            | Self::Body { identifier, .. } => identifier,
        }
    }

    /// Time spent before the fetch gave up
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Http { elapsed, .. }
            | Self::ContentMismatch { elapsed, .. }
            | Self::Network { elapsed, .. }
            | Self::Timeout { elapsed, .. }
            | Self::Body { elapsed, .. } => *elapsed,
        }
    }

    /// Short human-readable cause, without identifier or timing
    pub fn cause(&self) -> String {
        match self {
            Self::Http { status_code, .. } => format!("HTTP {}", status_code),
            Self::ContentMismatch { content_type, .. } => {
                format!("expected HTML, got {}", content_type)
            }
            Self::Network { cause, .. } | Self::Body { cause, .. } => cause.clone(),
            Self::Timeout { .. } => "timed out".to_string(),
        }
    }
}

/// Source of rendered post documents
///
/// Implementations may render with a scripted browser or fetch static
/// markup; the coordinator only sees the resulting page or a `FetchError`.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the rendered markup for one post
    async fn fetch(&self, identifier: &PostIdentifier) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use blog_harvest::config::FetcherConfig;
/// use blog_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches posts over plain HTTP
///
/// The mobile post variant is served fully rendered, so no script execution
/// is needed.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, identifier: &PostIdentifier) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();
        let id = identifier.to_string();

        let response = self
            .client
            .get(identifier.as_str())
            .send()
            .await
            .map_err(|e| classify_request_error(&id, e, start.elapsed()))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Http {
                identifier: id,
                status_code: status.as_u16(),
                elapsed: start.elapsed(),
            });
        }

        // A missing Content-Type is tolerated; a non-HTML one is not
        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type.contains("html") {
                return Err(FetchError::ContentMismatch {
                    identifier: id,
                    content_type: content_type.to_string(),
                    elapsed: start.elapsed(),
                });
            }
        }

        let body = response.text().await.map_err(|e| FetchError::Body {
            identifier: id.clone(),
            cause: e.to_string(),
            elapsed: start.elapsed(),
        })?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            body,
            elapsed: start.elapsed(),
        })
    }
}

fn classify_request_error(identifier: &str, error: reqwest::Error, elapsed: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            identifier: identifier.to_string(),
            elapsed,
        }
    } else if error.is_connect() {
        FetchError::Network {
            identifier: identifier.to_string(),
            cause: "Connection refused".to_string(),
            elapsed,
        }
    } else {
        FetchError::Network {
            identifier: identifier.to_string(),
            cause: error.to_string(),
            elapsed,
        }
    }
}
