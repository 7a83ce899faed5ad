//! Error types for the triage core.

use lightbox_store::StoreError;
use thiserror::Error;

/// Triage operation result type.
pub type Result<T> = std::result::Result<T, TriageError>;

/// Failures surfaced by the triage core.
#[derive(Error, Debug)]
pub enum TriageError {
    /// The configured category tag-set does not exist in the tag store.
    /// Category features are unavailable for this session.
    #[error("Category tag set '{0}' not found")]
    TagSetMissing(String),

    /// The configured category tag-set exists but holds no categories.
    #[error("Category tag set '{0}' is empty")]
    TagSetEmpty(String),

    /// A store seam failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
