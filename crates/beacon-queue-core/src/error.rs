//! Error types for the beacon queue core.

use thiserror::Error;

/// Errors raised synchronously at the producer boundary.
///
/// These are never queued: a record that fails here is rejected before it
/// reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),
}

/// Errors produced while reading or validating the configuration surface.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed declarative configuration.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid method: {0}")]
    InvalidMethod(String),
}
