//! Error types for the store seams.

use thiserror::Error;

/// Store operation result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures reported by the count source and tag store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing case/session is gone or closing; retry after it returns.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed the query.
    #[error("Query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}
