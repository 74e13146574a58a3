//! Blog search API client
//!
//! Seeds a batch from a keyword search. The API answers with JSON; only the
//! link, title and post date of each item are kept.

use crate::config::SearchConfig;
use crate::listing::ListingEntry;
use crate::{ConfigError, HarvestError, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Instant;

/// Response body of the blog search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub items: Vec<ListingEntry>,
}

/// Client for the keyword search endpoint
pub struct NaverSearchClient {
    client: Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
}

impl NaverSearchClient {
    /// Creates a client from the search configuration
    ///
    /// Fails when either credential is missing, so a misconfigured run stops
    /// before any request is sent.
    pub fn new(client: Client, config: &SearchConfig) -> std::result::Result<Self, ConfigError> {
        let client_id = config.client_id.clone().ok_or_else(|| {
            ConfigError::MissingCredentials("search client-id is not set".to_string())
        })?;
        let client_secret = config.client_secret.clone().ok_or_else(|| {
            ConfigError::MissingCredentials("search client-secret is not set".to_string())
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            client_id,
            client_secret,
        })
    }

    /// Searches for posts matching `keyword`
    ///
    /// Any failure is logged with the elapsed time and yields an empty
    /// listing; the batch simply has nothing to do.
    pub async fn search(&self, keyword: &str, count: u32) -> Vec<ListingEntry> {
        match self.try_search(keyword, count).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Search for '{}' failed: {}", keyword, e);
                Vec::new()
            }
        }
    }

    /// Searches for posts matching `keyword`, surfacing failures
    pub async fn try_search(&self, keyword: &str, count: u32) -> Result<Vec<ListingEntry>> {
        tracing::info!("Searching: keyword='{}', display={}", keyword, count);
        let start = Instant::now();
        let count = count.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", keyword), ("display", count.as_str())])
            .header("X-Naver-Client-Id", self.client_id.as_str())
            .header("X-Naver-Client-Secret", self.client_secret.as_str())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(HarvestError::Listing(format!(
                "search returned HTTP {} ({:.2}s)",
                status.as_u16(),
                start.elapsed().as_secs_f64()
            )));
        }

        let body: SearchResponse = response.json().await?;
        tracing::info!(
            "Search returned {} items of {} total ({:.2}s)",
            body.items.len(),
            body.total,
            start.elapsed().as_secs_f64()
        );

        Ok(body.items)
    }
}
