//! StorageBackend trait: the persistence medium behind the request store.
//!
//! The interface mirrors browser key/value storage: string keys, string
//! values, synchronous writes. Implementations include SQLite (durable)
//! and in-memory (for tests).

use std::sync::Arc;

use crate::error::Result;

/// Synchronous key/value persistence.
///
/// A `save` that returns `Ok` must survive a process restart for durable
/// backends. Implementations must be thread-safe (Send + Sync).
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}
