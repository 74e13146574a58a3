//! Output module for exporting records and reporting batches
//!
//! This module handles:
//! - Writing records to a spreadsheet-friendly CSV file
//! - Summarizing a finished batch on the console
//! - Previewing individual records

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::{write_records, CsvSink, BOM, COLUMNS, CRAWL_TIME_FORMAT};
pub use stats::{print_record, print_statistics, BatchStatistics};
pub use traits::{OutputError, OutputResult, ResultSink};
