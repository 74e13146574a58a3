//! Logging setup
//!
//! Installs the global `tracing` subscriber once per run: a console layer
//! filtered by verbosity and, optionally, a plain-text layer writing to a
//! per-run log file.

use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the filter for a verbosity level
///
/// `RUST_LOG`, when set, takes precedence.
pub fn build_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directives = if quiet {
        "error"
    } else {
        match verbose {
            0 => "blog_harvest=info,warn",
            1 => "blog_harvest=debug,info",
            2 => "blog_harvest=trace,debug",
            _ => "trace",
        }
    };
    EnvFilter::new(directives)
}

/// Name of the log file for a run started at `now`
///
/// # Examples
///
/// ```
/// use blog_harvest::logging::log_file_name;
/// use chrono::{Local, TimeZone};
///
/// let now = Local.with_ymd_and_hms(2024, 5, 2, 9, 15, 0).unwrap();
/// assert_eq!(log_file_name(now), "20240502_0915_harvest_logs.txt");
/// ```
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("{}_harvest_logs.txt", now.format("%Y%m%d_%H%M"))
}

/// Creates the log directory and opens this run's log file
pub fn open_log_file(directory: &Path, now: DateTime<Local>) -> io::Result<(PathBuf, File)> {
    fs::create_dir_all(directory)?;
    let path = directory.join(log_file_name(now));
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    Ok((path, file))
}

/// Sets up the logging/tracing subscriber
///
/// # Arguments
///
/// * `verbose` - Number of `-v` flags
/// * `quiet` - Only errors reach the console
/// * `log_dir` - Directory for the per-run log file, if any
///
/// # Returns
///
/// * `Ok(Some(path))` - Logging to the console and to `path`
/// * `Ok(None)` - Logging to the console only
/// * `Err(io::Error)` - The log file could not be opened
pub fn init_logging(verbose: u8, quiet: bool, log_dir: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let (log_path, file_layer) = match log_dir {
        Some(dir) => {
            let (path, file) = open_log_file(dir, Local::now())?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file));
            (Some(path), Some(layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(console)
        .with(file_layer)
        .init();

    Ok(log_path)
}
