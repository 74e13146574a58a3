//! Blog-Harvest main entry point
//!
//! This is the command-line interface for the Blog-Harvest post metadata
//! extractor.

use anyhow::{bail, Context};
use blog_harvest::config::{apply_env_overrides, load_config, validate, Config};
use blog_harvest::crawler::{crawl, BatchOutcome, CoordinatorOptions, CrawlItem};
use blog_harvest::listing::{load_listing_file, ListingEntry, NaverSearchClient};
use blog_harvest::logging::init_logging;
use blog_harvest::output::{print_record, print_statistics, BatchStatistics, CsvSink, ResultSink};
use clap::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Blog-Harvest: metadata extraction for blog posts
///
/// Blog-Harvest fetches blog posts, extracts body text and engagement
/// counters (hashtags, stickers, comments, likes, maps, images), and
/// exports the results as a CSV file.
#[derive(Parser, Debug)]
#[command(name = "blog-harvest")]
#[command(version)]
#[command(about = "Extracts blog post metadata into a CSV export", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Post URL to crawl (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// File with one post URL per line
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Seed the batch from a keyword search
    #[arg(long, value_name = "KEYWORD")]
    query: Option<String>,

    /// Number of search results to request (1-100)
    #[arg(long, value_name = "N", requires = "query")]
    display: Option<u32>,

    /// Write the CSV export to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_run_config(&cli)?;

    let log_dir = config.logging.directory.as_deref().map(Path::new);
    let log_path = init_logging(cli.verbose, cli.quiet, log_dir)
        .context("Failed to open the log file")?;
    if let Some(path) = log_path {
        tracing::info!("Writing logs to {}", path.display());
    }

    let entries = collect_listing(&cli, &config).await?;
    let items = into_items(entries);

    if cli.dry_run {
        handle_dry_run(&config, &items, cli.output.as_deref());
        return Ok(());
    }

    handle_crawl(&config, items, cli.output.as_deref()).await
}

/// Loads the config file (or defaults) and applies CLI and env overrides
fn load_run_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config);
    if let Some(display) = cli.display {
        config.search.display = display;
    }
    validate(&config).context("Invalid configuration")?;

    Ok(config)
}

/// Gathers listing entries from every source given on the command line
async fn collect_listing(cli: &Cli, config: &Config) -> anyhow::Result<Vec<ListingEntry>> {
    let mut entries: Vec<ListingEntry> = cli.urls.iter().map(ListingEntry::from_link).collect();

    if let Some(path) = &cli.input {
        let from_file = load_listing_file(path)?;
        tracing::info!("Loaded {} links from {}", from_file.len(), path.display());
        entries.extend(from_file);
    }

    if let Some(keyword) = &cli.query {
        let client = blog_harvest::crawler::build_http_client(&config.fetcher)
            .context("Failed to build HTTP client")?;
        let search = NaverSearchClient::new(client, &config.search)?;
        let found = search.search(keyword, config.search.display).await;
        tracing::info!("Search for '{}' returned {} posts", keyword, found.len());
        entries.extend(found);
    }

    Ok(entries)
}

/// Normalizes listing links, dropping invalid and duplicate ones
fn into_items(entries: Vec<ListingEntry>) -> Vec<CrawlItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(entries.len());

    for entry in entries {
        let link = entry.link.clone();
        match CrawlItem::from_listing(entry) {
            Ok(item) => {
                if seen.insert(item.identifier.clone()) {
                    items.push(item);
                } else {
                    tracing::debug!("Skipping duplicate link: {}", link);
                }
            }
            Err(e) => tracing::warn!("Skipping invalid link '{}': {}", link, e),
        }
    }

    items
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, items: &[CrawlItem], output: Option<&Path>) {
    let options = CoordinatorOptions::from_config(&config.crawler);

    println!("=== Blog-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", options.max_concurrency);
    match options.delay {
        Some(delay) => println!("  Pacing delay: {:?} - {:?}", delay.min(), delay.max()),
        None => println!("  Pacing delay: none"),
    }
    println!("  Fetch timeout: {:?}", options.fetch_timeout);
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nOutput:");
    match output {
        Some(path) => println!("  File: {}", path.display()),
        None => println!("  Directory: {}", config.output.directory),
    }

    println!("\nPosts ({}):", items.len());
    for item in items {
        println!("  - {}", item.identifier);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} posts", items.len());
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, items: Vec<CrawlItem>, output: Option<&Path>) -> anyhow::Result<()> {
    let single = items.len() == 1;
    let batch = crawl(config, items).await?;
    let stats = BatchStatistics::from_batch(&batch);

    if single {
        for record in batch.records() {
            print_record(record);
        }
    }

    match batch.outcome() {
        BatchOutcome::NoInput => {
            print_statistics(&stats, None);
            Ok(())
        }
        BatchOutcome::Exhausted => {
            print_statistics(&stats, None);
            bail!("Every post in the batch failed; nothing was exported")
        }
        BatchOutcome::Partial | BatchOutcome::Complete => {
            let sink = match output {
                Some(path) => sink_for_path(path)?,
                None => CsvSink::from_config(&config.output),
            };
            let path = sink.write(batch.records()).context("Failed to export records")?;
            print_statistics(&stats, Some(path.as_path()));
            Ok(())
        }
    }
}

fn sink_for_path(path: &Path) -> anyhow::Result<CsvSink> {
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("Output path has no file name: {}", path.display());
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(CsvSink::new(directory).with_filename(filename))
}
