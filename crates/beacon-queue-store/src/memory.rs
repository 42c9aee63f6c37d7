//! In-memory implementation of the StorageBackend trait.
//!
//! This is primarily for testing. Clones share the same map, so a second
//! `RequestStore` built from a clone behaves like a reloaded page (or a
//! second tab) reading the same browser storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Result, StoreError};
use crate::traits::StorageBackend;

/// In-memory backend.
///
/// Data lives as long as any clone does. Thread-safe via RwLock.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn key_count(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Drop every key, like a user clearing site storage.
    pub fn wipe(&self) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.clear();
        Ok(())
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Lock(e.to_string())
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
