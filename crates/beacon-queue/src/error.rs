//! Error types for the dispatcher.

use beacon_queue_core::{ConfigError, RecordError};
use beacon_queue_store::StoreError;
use thiserror::Error;

/// Errors raised synchronously to producers and initializers.
///
/// Delivery failures are not here: they are absorbed into queue state and
/// only observable as a stamped queue time on the pending record.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Producer handed over an unusable record.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Declarative configuration was malformed or invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for dispatcher operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
