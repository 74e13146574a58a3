//! Record assembly
//!
//! Runs every field extractor against one document and folds the results
//! into a complete [`Record`]. Extractors cannot fail, so assembly cannot
//! fail either; what varies is how many fields were actually found.

use crate::extract::fields::{self, Hashtags};
use crate::extract::RenderedDocument;
use crate::identifier::PostIdentifier;
use crate::listing::{sanitize_title, ListingEntry};

/// Which extractors located their field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPresence {
    pub body: bool,
    pub publish_date: bool,
    pub hashtags: bool,
    pub stickers: bool,
    pub comments: bool,
    pub likes: bool,
    pub maps: bool,
    pub images: bool,
}

impl FieldPresence {
    /// Number of fields that were found
    pub fn found_count(&self) -> usize {
        [
            self.body,
            self.publish_date,
            self.hashtags,
            self.stickers,
            self.comments,
            self.likes,
            self.maps,
            self.images,
        ]
        .iter()
        .filter(|found| **found)
        .count()
    }

    /// Names of the fields that were not found
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let fields = [
            ("body", self.body),
            ("publish_date", self.publish_date),
            ("hashtags", self.hashtags),
            ("stickers", self.stickers),
            ("comments", self.comments),
            ("likes", self.likes),
            ("maps", self.maps),
            ("images", self.images),
        ];
        for (name, found) in fields {
            if !found {
                missing.push(name);
            }
        }
        missing
    }
}

/// Assembled metadata for one post
///
/// Text fields default to an empty string and counts to zero, so a record
/// never has a missing column.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub identifier: PostIdentifier,
    pub body: String,
    pub publish_date: String,
    pub hashtag_count: u64,
    pub hashtags: Vec<String>,
    pub image_count: u64,
    pub sticker_count: u64,
    pub comment_count: u64,
    pub like_count: u64,
    pub map_count: u64,

    /// Title supplied by the listing source, emphasis markup removed
    pub title: Option<String>,

    /// Post date as reported by the listing source
    pub listing_post_date: Option<String>,

    pub presence: FieldPresence,
}

impl Record {
    /// Merges listing-supplied metadata into the record
    pub fn merge_listing(&mut self, entry: &ListingEntry) {
        if let Some(title) = &entry.title {
            self.title = Some(sanitize_title(title));
        }
        if let Some(post_date) = &entry.post_date {
            self.listing_post_date = Some(post_date.clone());
        }
    }
}

/// Runs all field extractors against `document` and builds the record
///
/// Every extractor runs regardless of what the others returned.
pub fn assemble(identifier: &PostIdentifier, document: &RenderedDocument) -> Record {
    let body = fields::extract_body(document);
    let publish_date = fields::extract_publish_date(document);
    let hashtags = fields::extract_hashtags(document);
    let stickers = fields::extract_sticker_count(document);
    let comments = fields::extract_comment_count(document);
    let likes = fields::extract_like_count(document);
    let maps = fields::extract_map_count(document);
    let images = fields::extract_image_count(document);

    let presence = FieldPresence {
        body: body.is_found(),
        publish_date: publish_date.is_found(),
        hashtags: hashtags.is_found(),
        stickers: stickers.is_found(),
        comments: comments.is_found(),
        likes: likes.is_found(),
        maps: maps.is_found(),
        images: images.is_found(),
    };

    let Hashtags {
        visible,
        additional,
    } = hashtags.unwrap_or_default();

    Record {
        identifier: identifier.clone(),
        body: body.unwrap_or_default(),
        publish_date: publish_date.unwrap_or_default(),
        hashtag_count: visible.len() as u64 + additional,
        hashtags: visible,
        image_count: images.unwrap_or_default(),
        sticker_count: stickers.unwrap_or_default(),
        comment_count: comments.unwrap_or_default(),
        like_count: likes.unwrap_or_default(),
        map_count: maps.unwrap_or_default(),
        title: None,
        listing_post_date: None,
        presence,
    }
}

/// Parses `markup` and assembles the record in one synchronous step
///
/// The parsed tree never outlives this call.
pub fn assemble_html(identifier: &PostIdentifier, markup: &str) -> Record {
    let document = RenderedDocument::parse(markup);
    assemble(identifier, &document)
}
