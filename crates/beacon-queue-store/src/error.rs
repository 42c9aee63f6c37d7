//! Error types for the store module.

use beacon_queue_core::RecordError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Persisted record list could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Malformed record rejected before it was persisted.
    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding the backend was poisoned.
    #[error("lock poisoned: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
