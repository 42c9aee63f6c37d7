//! # Beacon Queue Core
//!
//! Pure primitives for the beacon queue: request records, the configuration
//! surface, clocks, and producer-boundary validation.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`RequestRecord`] - The unit of delivery
//! - [`RecordId`] - Producer-supplied opaque identifier
//! - [`DispatchConfig`] - Endpoint, transport preference, suppression flag
//! - [`TransportKind`] - Discriminator for the three delivery strategies
//! - [`Clock`] - Source of queue-time timestamps

pub mod config;
pub mod error;
pub mod record;
pub mod time;
pub mod validation;

pub use config::{DispatchConfig, TransportKind, DEFAULT_METHOD, DEFAULT_REQUIRED_FIELDS};
pub use error::{ConfigError, RecordError};
pub use record::{Meta, RecordBuilder, RecordId, RequestRecord};
pub use time::{Clock, ManualClock, SystemClock};
pub use validation::{validate_record, validate_required_fields};
