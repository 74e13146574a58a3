//! Extraction pipeline
//!
//! This module turns a rendered post document into a [`Record`]:
//! - `document`: the queryable document wrapper
//! - `selectors`: the per-field fallback selector table
//! - `fields`: one extractor per metadata field
//! - `assembler`: runs all extractors and builds the record

mod assembler;
mod document;
mod field;
pub mod fields;
pub mod selectors;

pub use assembler::{assemble, assemble_html, FieldPresence, Record};
pub use document::{element_text, visible_text, RenderedDocument};
pub use field::FieldResult;
pub use fields::Hashtags;
