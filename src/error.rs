//! Error types for the storage and repository layers.

use thiserror::Error;

/// Failure inside a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error while opening or preparing the store.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// SQLite read or write error.
    #[error("sqlite failure: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors surfaced by repository mutations.
///
/// Mutations distinguish three outcome classes: a missing race id, a
/// domain-rule violation, and an underlying storage or serialization
/// failure. Reads never return these; a broken collection read logs a
/// warning and yields an empty collection instead.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No race with the given id.
    #[error("race not found: {0}")]
    NotFound(String),
    /// The request violates a domain rule (duplicate horse name,
    /// predicting on a race without entries).
    #[error("{0}")]
    Validation(String),
    /// The underlying store failed to read or write.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    /// A collection or snapshot could not be encoded or decoded.
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}
