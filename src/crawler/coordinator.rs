//! Crawl coordinator - batch orchestration logic
//!
//! This module runs one batch of post identifiers through fetch and
//! assembly:
//! - Bounding concurrency with a semaphore of worker slots
//! - Pacing each fetch with a random per-unit delay
//! - Enforcing a per-fetch timeout
//! - Isolating failures (and panics) to the identifier that caused them
//! - Collecting records in completion order

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{DocumentFetcher, FetchError};
use crate::crawler::pacing::DelayRange;
use crate::extract::{assemble_html, Record};
use crate::identifier::PostIdentifier;
use crate::listing::ListingEntry;
use crate::state::ItemState;
use crate::UrlResult;
use chrono::{DateTime, Local};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::Instrument;

/// Default cap on concurrent units of work
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// One identifier queued for a batch, with any listing metadata
#[derive(Debug, Clone)]
pub struct CrawlItem {
    pub identifier: PostIdentifier,
    pub listing: Option<ListingEntry>,
}

impl CrawlItem {
    pub fn new(identifier: PostIdentifier) -> Self {
        Self {
            identifier,
            listing: None,
        }
    }

    /// Normalizes a listing entry's link into a crawl item
    pub fn from_listing(entry: ListingEntry) -> UrlResult<Self> {
        Ok(Self {
            identifier: PostIdentifier::parse(&entry.link)?,
            listing: Some(entry),
        })
    }
}

/// An identifier that produced no record
#[derive(Debug, Clone)]
pub struct FailedItem {
    pub identifier: String,
    pub cause: String,
    pub elapsed: Duration,

    /// State the item was in when it failed, if known
    pub failed_during: Option<ItemState>,
}

/// How a batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// No identifiers were supplied
    NoInput,
    /// Identifiers were supplied and every one failed
    Exhausted,
    /// Some identifiers failed
    Partial,
    /// Every identifier produced a record
    Complete,
}

/// Result of one batch
///
/// Records are in completion order, not input order. Immutable once the
/// batch has finished.
#[derive(Debug, Clone)]
pub struct BatchResult {
    records: Vec<Record>,
    failures: Vec<FailedItem>,
    requested: usize,
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
    elapsed: Duration,
}

impl BatchResult {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn failures(&self) -> &[FailedItem] {
        &self.failures
    }

    /// Number of identifiers handed to the batch
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Local> {
        self.finished_at
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn outcome(&self) -> BatchOutcome {
        if self.requested == 0 {
            BatchOutcome::NoInput
        } else if self.records.is_empty() {
            BatchOutcome::Exhausted
        } else if self.failures.is_empty() {
            BatchOutcome::Complete
        } else {
            BatchOutcome::Partial
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Scheduling knobs for a batch
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Number of worker slots
    pub max_concurrency: usize,

    /// Pacing delay drawn before each fetch; `None` disables pacing
    pub delay: Option<DelayRange>,

    /// Upper bound on a single fetch
    pub fetch_timeout: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: effective_concurrency(DEFAULT_MAX_CONCURRENCY),
            delay: Some(DelayRange::from_millis(500, 1500)),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl CoordinatorOptions {
    /// Builds options from configuration, capping workers at the CPU count
    pub fn from_config(config: &CrawlerConfig) -> Self {
        let delay = DelayRange::from_millis(config.delay_min_ms, config.delay_max_ms);
        Self {
            max_concurrency: effective_concurrency(config.max_concurrency as usize),
            delay: if delay.is_zero() { None } else { Some(delay) },
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }
}

/// Worker count: the configured maximum, capped at available parallelism
pub fn effective_concurrency(configured: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    configured.min(available).max(1)
}

/// Batch coordinator
///
/// Owns the fetcher and scheduling options; every call to [`run`] is an
/// independent batch.
///
/// [`run`]: Coordinator::run
pub struct Coordinator {
    fetcher: Arc<dyn DocumentFetcher>,
    options: CoordinatorOptions,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// `options.max_concurrency` is used as given (minimum 1); use
    /// [`CoordinatorOptions::from_config`] to apply the CPU cap.
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, options: CoordinatorOptions) -> Self {
        Self { fetcher, options }
    }

    /// Number of worker slots
    pub fn concurrency(&self) -> usize {
        self.options.max_concurrency.max(1)
    }

    /// Crawls bare identifiers
    pub async fn run_identifiers(&self, identifiers: Vec<PostIdentifier>) -> BatchResult {
        self.run(identifiers.into_iter().map(CrawlItem::new).collect())
            .await
    }

    /// Runs one batch to completion
    ///
    /// Never fails: each item either yields a record or is recorded as a
    /// failure, and the sum of both equals the number of items.
    pub async fn run(&self, items: Vec<CrawlItem>) -> BatchResult {
        let requested = items.len();
        let started_at = Local::now();
        let start = Instant::now();
        let batch_span = tracing::info_span!("batch", size = requested);

        let (records, failures) = self
            .run_items(items, &batch_span)
            .instrument(batch_span.clone())
            .await;

        let result = BatchResult {
            records,
            failures,
            requested,
            started_at,
            finished_at: Local::now(),
            elapsed: start.elapsed(),
        };

        batch_span.in_scope(|| match result.outcome() {
            BatchOutcome::NoInput => tracing::info!("No identifiers supplied, nothing crawled"),
            BatchOutcome::Exhausted => tracing::warn!(
                "Batch finished with no records: all {} posts failed ({:.2}s)",
                requested,
                result.elapsed.as_secs_f64()
            ),
            BatchOutcome::Partial | BatchOutcome::Complete => tracing::info!(
                "Batch finished: {} succeeded, {} failed ({:.2}s)",
                result.succeeded(),
                result.failed(),
                result.elapsed.as_secs_f64()
            ),
        });

        result
    }

    async fn run_items(
        &self,
        items: Vec<CrawlItem>,
        batch_span: &tracing::Span,
    ) -> (Vec<Record>, Vec<FailedItem>) {
        let requested = items.len();
        let mut records = Vec::with_capacity(requested);
        let mut failures = Vec::new();

        if requested == 0 {
            return (records, failures);
        }

        tracing::info!(
            "Starting batch of {} posts with {} workers",
            requested,
            self.concurrency()
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency()));
        let mut tasks = JoinSet::new();
        let mut in_flight: HashMap<Id, String> = HashMap::with_capacity(requested);

        for item in items {
            let span = tracing::info_span!(parent: batch_span, "post", id = %item.identifier);
            let identifier = item.identifier.to_string();
            let unit = WorkUnit {
                item,
                fetcher: Arc::clone(&self.fetcher),
                semaphore: Arc::clone(&semaphore),
                delay: self.options.delay,
                fetch_timeout: self.options.fetch_timeout,
            };
            let handle = tasks.spawn(unit.run().instrument(span));
            in_flight.insert(handle.id(), identifier);
        }

        // Single writer: only this loop appends to the result collections
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, ItemOutcome::Completed { record, elapsed })) => {
                    in_flight.remove(&id);
                    tracing::info!(
                        "Completed {} ({:.2}s, {}/8 fields found)",
                        record.identifier,
                        elapsed.as_secs_f64(),
                        record.presence.found_count()
                    );
                    records.push(record);
                }
                Ok((id, ItemOutcome::Failed(failed))) => {
                    in_flight.remove(&id);
                    tracing::warn!(
                        "Failed {} after {:.2}s: {}",
                        failed.identifier,
                        failed.elapsed.as_secs_f64(),
                        failed.cause
                    );
                    failures.push(failed);
                }
                Err(e) => {
                    let failed = unjoined_failure(&e, &mut in_flight);
                    tracing::error!(
                        "Worker task for {} ended abnormally: {}",
                        failed.identifier,
                        failed.cause
                    );
                    failures.push(failed);
                }
            }

            let done = records.len() + failures.len();
            if done % 10 == 0 && done < requested {
                tracing::info!("Progress: {}/{} posts done", done, requested);
            }
        }

        (records, failures)
    }
}

/// Failure for a task that ended without reporting an outcome
fn unjoined_failure(error: &JoinError, in_flight: &mut HashMap<Id, String>) -> FailedItem {
    let identifier = in_flight
        .remove(&error.id())
        .unwrap_or_else(|| format!("task {}", error.id()));
    let cause = if error.is_cancelled() {
        "worker cancelled".to_string()
    } else {
        "worker panicked".to_string()
    };

    FailedItem {
        identifier,
        cause,
        elapsed: Duration::ZERO,
        failed_during: None,
    }
}

enum ItemOutcome {
    Completed { record: Record, elapsed: Duration },
    Failed(FailedItem),
}

/// Everything one spawned task needs to process a single item
struct WorkUnit {
    item: CrawlItem,
    fetcher: Arc<dyn DocumentFetcher>,
    semaphore: Arc<Semaphore>,
    delay: Option<DelayRange>,
    fetch_timeout: Duration,
}

impl WorkUnit {
    async fn run(self) -> ItemOutcome {
        let identifier = self.item.identifier.to_string();
        let start = Instant::now();

        match AssertUnwindSafe(self.process()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => ItemOutcome::Failed(FailedItem {
                identifier,
                cause: "worker panicked".to_string(),
                elapsed: start.elapsed(),
                failed_during: None,
            }),
        }
    }

    async fn process(self) -> ItemOutcome {
        let WorkUnit {
            item,
            fetcher,
            semaphore,
            delay,
            fetch_timeout,
        } = self;
        let mut tracker = StateTracker::new(&item.identifier);

        // The permit is this unit's fetch slot; dropping it frees the slot,
        // whichever way the unit ends
        let _permit = match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return tracker.fail("worker pool closed".to_string(), Duration::ZERO),
        };

        let start = Instant::now();
        tracing::info!("Starting {}", item.identifier);
        tracker.advance(ItemState::Fetching);

        if let Some(delay) = delay {
            let pause = delay.sample();
            if !pause.is_zero() {
                tracing::debug!("Pacing {} for {:?}", item.identifier, pause);
                tokio::time::sleep(pause).await;
            }
        }

        let page = match tokio::time::timeout(fetch_timeout, fetcher.fetch(&item.identifier)).await
        {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => return tracker.fail(e.cause(), start.elapsed()),
            Err(_) => {
                let e = FetchError::Timeout {
                    identifier: item.identifier.to_string(),
                    elapsed: start.elapsed(),
                };
                return tracker.fail(format!("{} after {:?}", e.cause(), fetch_timeout), e.elapsed());
            }
        };

        tracing::debug!(
            "Fetched {} (HTTP {}, {} bytes, {:.2}s)",
            page.final_url,
            page.status_code,
            page.body.len(),
            page.elapsed.as_secs_f64()
        );

        tracker.advance(ItemState::Assembling);
        let mut record = assemble_html(&item.identifier, &page.body);
        drop(page);

        if let Some(listing) = &item.listing {
            record.merge_listing(listing);
        }

        if record.presence.found_count() < 8 {
            tracing::debug!(
                "{} missing fields: {}",
                item.identifier,
                record.presence.missing().join(", ")
            );
        }

        tracker.advance(ItemState::Completed);
        ItemOutcome::Completed {
            record,
            elapsed: start.elapsed(),
        }
    }
}

/// Walks one item through its state machine, logging each transition
struct StateTracker {
    identifier: String,
    state: ItemState,
}

impl StateTracker {
    fn new(identifier: &PostIdentifier) -> Self {
        Self {
            identifier: identifier.to_string(),
            state: ItemState::Queued,
        }
    }

    fn advance(&mut self, next: ItemState) {
        match self.state.transition(next) {
            Ok(state) => {
                tracing::trace!("{}: {} -> {}", self.identifier, self.state, state);
                self.state = state;
            }
            Err(e) => tracing::error!("{}: {}", self.identifier, e),
        }
    }

    fn fail(mut self, cause: String, elapsed: Duration) -> ItemOutcome {
        let failed_during = self.state;
        self.advance(ItemState::Failed);
        ItemOutcome::Failed(FailedItem {
            identifier: self.identifier,
            cause,
            elapsed,
            failed_during: Some(failed_during),
        })
    }
}
