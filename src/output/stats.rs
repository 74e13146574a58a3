//! Batch statistics and console reporting
//!
//! This module summarizes a finished batch and prints it, along with short
//! per-record previews, to stdout.

use crate::crawler::{BatchOutcome, BatchResult, FailedItem};
use crate::extract::Record;
use std::path::Path;

/// Number of body characters shown in a record preview
pub const PREVIEW_CHARS: usize = 200;

/// Batch statistics summary
#[derive(Debug, Clone)]
pub struct BatchStatistics {
    /// Identifiers handed to the batch
    pub requested: usize,

    /// Records produced
    pub succeeded: usize,

    /// Identifiers that failed
    pub failed: usize,

    /// Wall-clock duration in seconds
    pub elapsed_secs: f64,

    /// How the batch ended
    pub outcome: BatchOutcome,

    /// Per field, how many records found it
    pub field_coverage: Vec<(&'static str, usize)>,

    /// Failed identifiers with their causes
    pub failures: Vec<FailedItem>,
}

impl BatchStatistics {
    pub fn from_batch(batch: &BatchResult) -> Self {
        Self {
            requested: batch.requested(),
            succeeded: batch.succeeded(),
            failed: batch.failed(),
            elapsed_secs: batch.elapsed().as_secs_f64(),
            outcome: batch.outcome(),
            field_coverage: field_coverage(batch.records()),
            failures: batch.failures().to_vec(),
        }
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.requested == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.requested as f64) * 100.0
    }
}

/// Counts, for each of the eight fields, the records that found it
pub fn field_coverage(records: &[Record]) -> Vec<(&'static str, usize)> {
    let names = [
        "body",
        "publish_date",
        "hashtags",
        "stickers",
        "comments",
        "likes",
        "maps",
        "images",
    ];
    names
        .iter()
        .map(|name| {
            let found = records
                .iter()
                .filter(|r| !r.presence.missing().contains(name))
                .count();
            (*name, found)
        })
        .collect()
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `export` - Where the records were written, if anywhere
pub fn print_statistics(stats: &BatchStatistics, export: Option<&Path>) {
    println!("=== Harvest Summary ===\n");

    match stats.outcome {
        BatchOutcome::NoInput => {
            println!("No post links were supplied; nothing was crawled.");
            return;
        }
        BatchOutcome::Exhausted => {
            println!(
                "All {} posts failed; no records were produced.",
                stats.requested
            );
        }
        BatchOutcome::Partial | BatchOutcome::Complete => {}
    }

    println!("Overview:");
    println!("  Posts requested: {}", stats.requested);
    println!("  Succeeded: {}", stats.succeeded);
    println!("  Failed: {}", stats.failed);
    println!("  Duration: {:.2}s", stats.elapsed_secs);
    println!();

    if stats.succeeded > 0 {
        println!("Field Coverage:");
        for (field, found) in &stats.field_coverage {
            println!("  {}: {}/{}", field, found, stats.succeeded);
        }
        println!();
    }

    if !stats.failures.is_empty() {
        println!("Failures ({}):", stats.failures.len());
        for failure in &stats.failures {
            println!(
                "  - {} ({}, {:.2}s)",
                failure.identifier,
                failure.cause,
                failure.elapsed.as_secs_f64()
            );
        }
        println!();
    }

    if let Some(path) = export {
        println!("Exported to: {}", path.display());
    }

    println!(
        "Success Rate: {:.1}% ({} / {} posts)",
        stats.success_rate(),
        stats.succeeded,
        stats.requested
    );
}

/// Prints one record with its body shortened to a preview
pub fn print_record(record: &Record) {
    println!("URL: {}", record.identifier);
    if let Some(title) = &record.title {
        println!("Title: {}", title);
    }
    println!("Published: {}", record.publish_date);
    println!(
        "Hashtags: {} {:?}",
        record.hashtag_count, record.hashtags
    );
    println!("Images: {}", record.image_count);
    println!("Stickers: {}", record.sticker_count);
    println!("Comments: {}", record.comment_count);
    println!("Likes: {}", record.like_count);
    println!("Maps: {}", record.map_count);
    println!("Content: {}", preview(&record.body, PREVIEW_CHARS));
    println!();
}

/// First `limit` characters of `text`, with an ellipsis if cut
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
