//! # Beacon Queue Transport
//!
//! Delivery strategies for pending request records and the chain that picks
//! between them.
//!
//! ## Overview
//!
//! Three transports share one contract, [`Transport`]: a capability probe
//! (`detect`) and a single-shot `send` that always resolves to exactly one
//! [`TransportOutcome`]. The [`TransportChain`] orders them by priority and
//! falls through on *detection* failure only. A send failure from a
//! transport that was actually attempted is reported as-is; it never causes
//! a second transport to be tried for the same record.
//!
//! | Kind | Backend | Success |
//! |---|---|---|
//! | `beacon` | [`BeaconTransport`] | payload accepted for background delivery |
//! | `xhr` | [`HttpTransport`] | 2xx response |
//! | `image` | [`PixelTransport`] | 2xx response to the pixel GET |
//!
//! ## Priority
//!
//! ```text
//! pinned kind         -> [pinned]
//! use_send_beacon     -> [beacon, xhr, image]
//! otherwise           -> [xhr, image]
//! ```
//!
//! ## Testing
//!
//! [`memory::ScriptedTransport`] replays scripted outcomes and records every
//! call, so dispatch logic can be exercised without a network.

pub mod beacon;
pub mod chain;
pub mod error;
pub mod http;
pub mod memory;
pub mod pixel;
pub mod traits;

pub use beacon::{BeaconTransport, MAX_BEACON_BYTES};
pub use chain::{ChainOutcome, TransportChain};
pub use error::{Result, TransportError};
pub use http::{ClientConfig, HttpTransport};
pub use memory::{ScriptedTransport, SentRequest};
pub use pixel::{pixel_url, PixelTransport, PIXEL_DATA_PARAM};
pub use traits::{Target, Transport, TransportOutcome};
