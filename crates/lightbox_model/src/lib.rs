//! Shared identifiers and value types for Lightbox.

pub mod ids;
pub mod types;

pub use ids::{AppliedTagId, IdParseError, ItemId, TagId};
pub use types::{
    AppliedTag, Category, CategoryCount, ChangeEvent, TagNotice, TagSet,
};
