//! Lightbox Test Utilities
//!
//! In-memory doubles for the two store seams, with fault injection for
//! exercising the failure paths (unavailable count source, failing
//! deletions) without a real backend.
//!
//! # Usage
//!
//! ```rust
//! use lightbox_model::{ItemId, TagId};
//! use lightbox_store::TagStore;
//! use lightbox_test_utils::MemoryTagStore;
//!
//! let store = MemoryTagStore::new();
//! store.insert_tag_set(MemoryTagStore::project_vic_set());
//! let tag = store.apply(ItemId::new(1), TagId::new(101), None);
//! assert_eq!(store.tags_on(tag.item).unwrap().len(), 1);
//! ```

pub mod count_source;
pub mod tag_store;

pub use count_source::FakeCountSource;
pub use tag_store::MemoryTagStore;
