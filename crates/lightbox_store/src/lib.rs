//! External store interfaces for the Lightbox triage core.
//!
//! The core never talks to a database directly. It sees two seams: an
//! authoritative count source and a tag store. The host wires real
//! persistence behind them; tests wire in-memory doubles.

pub mod error;

pub use error::{Result, StoreError};

use lightbox_model::{AppliedTag, ItemId, TagId, TagSet};

/// Authoritative per-category count source.
///
/// Queried to (re)populate a counter after first access or invalidation.
/// `Unavailable` failures are retryable; the caller must not treat them
/// as a count of zero.
pub trait CountSource: Send + Sync {
    fn count(&self, category: TagId) -> Result<i64>;
}

/// The host's tag store, observed and repaired by the triage core.
///
/// The store also emits tag-added / tag-deleted notifications; routing
/// those into the enforcer is the host's concern.
pub trait TagStore: Send + Sync {
    /// Look up a named tag-set. `Ok(None)` means the set does not exist.
    fn tag_set(&self, name: &str) -> Result<Option<TagSet>>;

    /// All tag instances currently applied to an item.
    fn tags_on(&self, item: ItemId) -> Result<Vec<AppliedTag>>;

    /// Delete one applied tag instance.
    fn delete_tag(&self, tag: &AppliedTag) -> Result<()>;
}
