//! # Beacon Queue
//!
//! Durable client-side event delivery for analytics beacons.
//!
//! ## Overview
//!
//! Producers hand records to the [`Dispatcher`], which persists them in a
//! [`RequestStore`](store::RequestStore) before anything touches the network.
//! A dispatch pass then drains the store oldest first through a
//! [`TransportChain`](transport::TransportChain):
//!
//! - **Beacon**: fire-and-forget background POST, opt-in via `useSendBeacon`
//! - **XHR**: credentialed JSON request, the default
//! - **Image pixel**: `GET ?data=<json>`, the fallback when XHR is unusable
//!
//! The chain falls through on *detection* failure only. A failed send
//! stamps the record's queue time and leaves it pending for the next pass.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use beacon_queue::{DispatchConfig, Dispatcher, RequestRecord};
//! use beacon_queue::store::{RequestStore, SqliteBackend};
//! use beacon_queue::transport::{ClientConfig, TransportChain};
//!
//! async fn example() -> beacon_queue::Result<()> {
//!     let store = RequestStore::new(SqliteBackend::open("beacon.db")?);
//!     let chain = TransportChain::http(&ClientConfig::default());
//!     let config = DispatchConfig::new("https://collect.example.com/e")?
//!         .with_send_beacon(true);
//!
//!     let dispatcher = Dispatcher::new(store, chain, config);
//!
//!     let record = RequestRecord::builder("r1")
//!         .category("video")
//!         .action("seek")
//!         .build();
//!     dispatcher.add_and_run(record).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `beacon_queue::core` - Records, configuration, clocks
//! - `beacon_queue::store` - Request store and storage backends
//! - `beacon_queue::transport` - Transports and the priority chain

pub mod dispatcher;
pub mod error;
pub mod gate;

// Re-export component crates
pub use beacon_queue_core as core;
pub use beacon_queue_store as store;
pub use beacon_queue_transport as transport;

pub use dispatcher::{Dispatcher, PassReport};
pub use error::{DispatchError, Result};
pub use gate::SuppressionGate;

// Re-export commonly used core types
pub use beacon_queue_core::{
    DispatchConfig, RecordBuilder, RecordId, RequestRecord, TransportKind,
};
