//! CSV export of assembled records
//!
//! Files open cleanly in spreadsheet tools: a UTF-8 byte-order mark comes
//! first, then a header row, then one row per record.

use crate::config::OutputConfig;
use crate::extract::Record;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Column order of every export
pub const COLUMNS: [&str; 12] = [
    "URL",
    "Content",
    "PublishDate",
    "HashtagCount",
    "ImageCount",
    "StickerCount",
    "CommentCount",
    "LikeCount",
    "MapCount",
    "Title",
    "APIPostDate",
    "Crawling_Time",
];

/// UTF-8 byte-order mark
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Format of the crawl timestamp column
pub const CRAWL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes records to a CSV file inside an output directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
    filename: Option<String>,
}

impl CsvSink {
    /// Creates a sink writing timestamped files into `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            filename: None,
        }
    }

    /// Uses a fixed file name instead of a timestamped one
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
            filename: config.filename.clone(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Default file name for an export started at `now`
    ///
    /// # Examples
    ///
    /// ```
    /// use blog_harvest::output::CsvSink;
    /// use chrono::{Local, TimeZone};
    ///
    /// let now = Local.with_ymd_and_hms(2024, 5, 2, 9, 15, 0).unwrap();
    /// assert_eq!(CsvSink::default_filename(now), "blog_content_20240502_091500.csv");
    /// ```
    pub fn default_filename(now: DateTime<Local>) -> String {
        format!("blog_content_{}.csv", now.format("%Y%m%d_%H%M%S"))
    }

    /// Path the export started at `now` is written to
    pub fn output_path(&self, now: DateTime<Local>) -> PathBuf {
        match &self.filename {
            Some(name) => self.directory.join(name),
            None => self.directory.join(Self::default_filename(now)),
        }
    }

    /// Writes `records` stamped with `crawl_time`
    ///
    /// The output directory is created if missing. Refuses to create a file
    /// when there is nothing to write.
    pub fn write_at(&self, records: &[Record], crawl_time: DateTime<Local>) -> OutputResult<PathBuf> {
        if records.is_empty() {
            return Err(OutputError::Empty);
        }

        fs::create_dir_all(&self.directory)?;
        let path = self.output_path(crawl_time);

        let mut writer = BufWriter::new(File::create(&path)?);
        write_records(&mut writer, records, crawl_time)?;
        writer
            .flush()
            .map_err(|e| OutputError::Write(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Exported {} records to {}", records.len(), path.display());
        Ok(path)
    }
}

impl ResultSink for CsvSink {
    fn write(&self, records: &[Record]) -> OutputResult<PathBuf> {
        self.write_at(records, Local::now())
    }
}

/// Writes the BOM, header and one row per record to `writer`
///
/// Every row carries the same crawl timestamp.
pub fn write_records<W: Write>(
    mut writer: W,
    records: &[Record],
    crawl_time: DateTime<Local>,
) -> OutputResult<()> {
    writer.write_all(BOM)?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(COLUMNS)?;

    let crawl_time = crawl_time.format(CRAWL_TIME_FORMAT).to_string();
    for record in records {
        csv.write_record(row(record, &crawl_time))?;
    }

    csv.flush()?;
    Ok(())
}

fn row(record: &Record, crawl_time: &str) -> [String; 12] {
    [
        record.identifier.to_string(),
        record.body.clone(),
        record.publish_date.clone(),
        record.hashtag_count.to_string(),
        record.image_count.to_string(),
        record.sticker_count.to_string(),
        record.comment_count.to_string(),
        record.like_count.to_string(),
        record.map_count.to_string(),
        record.title.clone().unwrap_or_default(),
        record.listing_post_date.clone().unwrap_or_default(),
        crawl_time.to_string(),
    ]
}
