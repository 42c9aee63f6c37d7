//! Error types for the transport module.

use beacon_queue_core::TransportKind;
use thiserror::Error;

/// Errors raised while constructing transports or preparing a request.
///
/// These never escape [`Transport::send`](crate::Transport::send); a send
/// folds them into a retryable [`TransportOutcome`](crate::TransportOutcome).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Capability check failed; the chain falls through to the next kind.
    #[error("transport unavailable: {0}")]
    Unavailable(TransportKind),

    /// HTTP client could not be built.
    #[error("client error: {0}")]
    Client(String),

    /// Record could not be encoded for the wire.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Encoding(e.to_string())
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
