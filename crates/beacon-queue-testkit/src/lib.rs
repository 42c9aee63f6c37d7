//! # Beacon Queue Testkit
//!
//! Testing utilities for the beacon queue.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: shared in-memory storage, a manual clock, and scripted
//!   transports wired into ready-made dispatchers
//! - **Generators**: Proptest strategies for records, payloads and outcomes
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use beacon_queue_testkit::generators::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn record_has_required_tags(params: RecordParams) {
//!         let record = record_from_params("r1", &params);
//!         prop_assert!(record.meta_value("category").is_some());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use beacon_queue_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let dispatcher = fixture.dispatcher();
//! dispatcher.add(fixture.make_event("video", "play")).unwrap();
//! assert_eq!(fixture.store().len().unwrap(), 1);
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{fixture_config, make_event_with_id, random_id, TestFixture};
pub use generators::{record_from_params, RecordParams};
