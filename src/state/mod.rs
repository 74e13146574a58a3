//! State module for tracking batch progress
//!
//! `ItemState` tracks one identifier from the moment it is queued until a
//! record is produced or the item is written off as failed.

mod item_state;

pub use item_state::ItemState;
