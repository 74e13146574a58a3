//! Output sink traits and types
//!
//! This module defines the trait interface for result sinks and the errors
//! they can report.

use crate::extract::Record;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No records to export")]
    Empty,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the records of one batch
///
/// A sink consumes the whole batch at once; it is never handed records
/// while the batch is still running.
pub trait ResultSink {
    /// Writes every record and returns where they went
    ///
    /// # Arguments
    ///
    /// * `records` - Records in completion order
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Location of the written export
    /// * `Err(OutputError)` - Nothing to write, or the write failed
    fn write(&self, records: &[Record]) -> OutputResult<PathBuf>;
}
