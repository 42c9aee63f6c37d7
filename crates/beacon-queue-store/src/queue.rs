//! The request store: an ordered, persisted list of pending records.
//!
//! The persisted layout is a single JSON array stored under [`STORAGE_KEY`].
//! Every operation reads the array from the backend, applies its change, and
//! writes it back before returning. Nothing is cached, so two stores sharing a
//! backend observe each other's appends.

use std::sync::Mutex;

use beacon_queue_core::{validate_record, RecordError, RecordId, RequestRecord};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::StorageBackend;

/// Fixed storage key for the pending request list.
pub const STORAGE_KEY: &str = "requests";

/// Result of appending a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendResult {
    /// Record was added at the tail.
    Appended,
    /// A record with the same id existed; it was dropped and the new one
    /// appended at the tail.
    Replaced,
}

/// Ordered, durable list of pending request records.
pub struct RequestStore<B: StorageBackend> {
    backend: B,
    key: String,
    /// Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl<B: StorageBackend> RequestStore<B> {
    /// Create a store over `backend`, rehydrating whatever it already holds.
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    /// Create a store under a custom storage key.
    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a record at the tail and persist it.
    ///
    /// An existing record with the same id is taken out and the incoming one
    /// goes to the tail, so [`last`](Self::last) is always the most recent
    /// append. The earlier queue time is kept unless the incoming record
    /// carries one.
    pub fn append(&self, mut record: RequestRecord) -> Result<AppendResult> {
        validate_record(&record)?;

        self.mutate(|records| {
            match records.iter().position(|r| r.id == record.id) {
                Some(pos) => {
                    let previous = records.remove(pos);
                    if record.queue_time.is_none() {
                        record.queue_time = previous.queue_time;
                    }
                    debug!(record_id = %record.id, "re-queued record at tail");
                    records.push(record);
                    (AppendResult::Replaced, true)
                }
                None => {
                    debug!(record_id = %record.id, pending = records.len() + 1, "queued record");
                    records.push(record);
                    (AppendResult::Appended, true)
                }
            }
        })
    }

    /// Delete the record with `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &RecordId) -> Result<bool> {
        self.mutate(|records| {
            let before = records.len();
            records.retain(|r| &r.id != id);
            let removed = records.len() != before;
            (removed, removed)
        })
    }

    /// Stamp the first-failure time on `id`.
    ///
    /// Returns the queue time the record now carries, which is the earlier
    /// stamp if one was already set, or `None` if the record is gone.
    pub fn mark_failed(&self, id: &RecordId, at: i64) -> Result<Option<i64>> {
        self.mutate(|records| match records.iter_mut().find(|r| &r.id == id) {
            Some(record) => match record.queue_time {
                Some(existing) => (Some(existing), false),
                None => {
                    record.queue_time = Some(at);
                    (Some(at), true)
                }
            },
            None => (None, false),
        })
    }

    /// Atomically overwrite the whole list.
    ///
    /// The list must contain only valid records with unique ids.
    pub fn replace(&self, list: Vec<RequestRecord>) -> Result<()> {
        for (i, record) in list.iter().enumerate() {
            validate_record(record)?;
            if list[..i].iter().any(|r| r.id == record.id) {
                return Err(StoreError::InvalidRecord(RecordError::InvalidRecord(
                    format!("duplicate id in replacement list: {}", record.id),
                )));
            }
        }

        let _guard = self.lock()?;
        self.write(&list)
    }

    /// Remove every pending record. This is the only way the list is cleared.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        self.backend.delete(&self.key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of all pending records, oldest first.
    pub fn all(&self) -> Result<Vec<RequestRecord>> {
        self.read()
    }

    /// The most recently appended record.
    pub fn last(&self) -> Result<Option<RequestRecord>> {
        Ok(self.read()?.pop())
    }

    /// Look up a record by id.
    pub fn get(&self, id: &RecordId) -> Result<Option<RequestRecord>> {
        Ok(self.read()?.into_iter().find(|r| &r.id == id))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::Lock(format!("request store: {}", e)))
    }

    fn read(&self) -> Result<Vec<RequestRecord>> {
        match self.backend.load(&self.key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                StoreError::Serialization(format!("corrupt '{}' entry: {}", self.key, e))
            }),
        }
    }

    fn write(&self, records: &[RequestRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.save(&self.key, &raw)
    }

    /// Read, apply `f`, and write back if `f` reports a change.
    fn mutate<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<RequestRecord>) -> (T, bool),
    {
        let _guard = self.lock()?;
        let mut records = self.read()?;
        let (out, dirty) = f(&mut records);
        if dirty {
            self.write(&records)?;
        }
        Ok(out)
    }
}
