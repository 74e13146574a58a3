//! Listing sources that seed a batch
//!
//! A listing supplies candidate post links, optionally with a title and the
//! post date reported by the source. Two sources exist:
//! - the blog search API (`search`)
//! - a plain text file with one link per line

mod search;

pub use search::{NaverSearchClient, SearchResponse};

use crate::{HarvestError, Result};
use serde::Deserialize;
use std::path::Path;

/// One candidate post supplied by a listing source
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingEntry {
    /// Link to the post, not yet normalized
    pub link: String,

    /// Title as returned by the source, may contain emphasis markup
    #[serde(default)]
    pub title: Option<String>,

    /// Post date as reported by the source (e.g. `20240502`)
    #[serde(default, rename = "postdate")]
    pub post_date: Option<String>,
}

impl ListingEntry {
    /// Creates an entry carrying only a link
    pub fn from_link(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: None,
            post_date: None,
        }
    }
}

/// Strips the emphasis markup search results wrap around matched keywords
///
/// # Examples
///
/// ```
/// use blog_harvest::listing::sanitize_title;
///
/// assert_eq!(sanitize_title("<b>Seoul</b> cafe"), "Seoul cafe");
/// ```
pub fn sanitize_title(title: &str) -> String {
    title.replace("<b>", "").replace("</b>", "")
}

/// Reads one link per line from a text file
///
/// Blank lines and lines starting with `#` are skipped.
pub fn load_listing_file(path: &Path) -> Result<Vec<ListingEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        HarvestError::Listing(format!("Failed to read {}: {}", path.display(), e))
    })?;

    Ok(parse_listing(&content))
}

/// Parses listing text, one link per line
pub fn parse_listing(content: &str) -> Vec<ListingEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ListingEntry::from_link)
        .collect()
}
