//! Crawler module for post fetching and batch orchestration
//!
//! This module contains the crawling logic, including:
//! - The `DocumentFetcher` seam and its HTTP implementation
//! - Per-unit pacing delays
//! - Bounded-concurrency batch coordination

mod coordinator;
mod fetcher;
mod pacing;

pub use coordinator::{
    effective_concurrency, BatchOutcome, BatchResult, Coordinator, CoordinatorOptions, CrawlItem,
    FailedItem, DEFAULT_MAX_CONCURRENCY,
};
pub use fetcher::{build_http_client, DocumentFetcher, FetchError, FetchedPage, HttpFetcher};
pub use pacing::DelayRange;

use crate::config::Config;
use crate::HarvestError;
use std::sync::Arc;

/// Runs one batch over HTTP with the configured scheduling
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client
/// 2. Derive worker count, pacing and timeout from the config
/// 3. Fetch and assemble every item
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `items` - Items to crawl
///
/// # Returns
///
/// * `Ok(BatchResult)` - Batch ran; individual items may still have failed
/// * `Err(HarvestError)` - The HTTP client could not be built
pub async fn crawl(config: &Config, items: Vec<CrawlItem>) -> Result<BatchResult, HarvestError> {
    let fetcher = HttpFetcher::new(&config.fetcher)?;
    let coordinator = Coordinator::new(
        Arc::new(fetcher),
        CoordinatorOptions::from_config(&config.crawler),
    );
    Ok(coordinator.run(items).await)
}
