//! # Beacon Queue Store
//!
//! Durable storage for pending request records.
//!
//! ## Overview
//!
//! The [`RequestStore`] owns the ordered list of records awaiting delivery.
//! It persists through an injected [`StorageBackend`], a small key/value
//! interface modelled on browser storage, so tests can run against
//! [`MemoryBackend`] and production against [`SqliteBackend`].
//!
//! ## Key Types
//!
//! - [`RequestStore`] - Ordered, persisted record list
//! - [`StorageBackend`] - Key/value persistence medium
//! - [`MemoryBackend`] - Shared in-memory backend for tests
//! - [`SqliteBackend`] - SQLite-based persistent backend
//! - [`AppendResult`] - Result of appending a record
//!
//! ## Usage
//!
//! ```rust,no_run
//! use beacon_queue_core::RequestRecord;
//! use beacon_queue_store::{RequestStore, SqliteBackend};
//!
//! let backend = SqliteBackend::open("beacon.db").unwrap();
//! let store = RequestStore::new(backend);
//!
//! let record = RequestRecord::builder("r1").category("video").action("seek").build();
//! store.append(record).unwrap();
//! assert_eq!(store.len().unwrap(), 1);
//! ```
//!
//! ## Design Notes
//!
//! - **Durable before risky**: every mutation is written through before it returns
//! - **Unique ids**: appending an existing id moves it to the tail
//! - **First failure wins**: `mark_failed` never overwrites an existing queue time
//! - **Shared storage**: handles over one backend see each other's appends

pub mod error;
pub mod memory;
pub mod migration;
pub mod queue;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryBackend;
pub use queue::{AppendResult, RequestStore, STORAGE_KEY};
pub use sqlite::SqliteBackend;
pub use traits::StorageBackend;
