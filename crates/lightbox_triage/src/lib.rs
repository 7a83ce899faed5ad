//! Category triage core: cached per-category counts, tag-consistency
//! enforcement, and change-event fan-out.
//!
//! The engine keeps a forensic triage session's per-category item counts
//! correct while tag assignments happen concurrently with UI queries,
//! without re-scanning the authoritative store on every read. Tag-store
//! notifications flow into the [`ConsistencyEnforcer`], which repairs the
//! at-most-one-category-per-item invariant, adjusts the [`CountCache`],
//! and posts a [`lightbox_model::ChangeEvent`] through the
//! [`EventDistributor`] to every registered observer.

pub mod counts;
pub mod distributor;
pub mod enforcer;
pub mod error;
pub mod registry;
pub mod session;

pub use counts::CountCache;
pub use distributor::{ChangeObserver, EventDistributor, EventPoster};
pub use enforcer::ConsistencyEnforcer;
pub use error::{Result, TriageError};
pub use registry::CategoryRegistry;
pub use session::{SessionConfig, TriageSession, DEFAULT_CATEGORY_TAG_SET};
