//! Test fixtures and helpers.
//!
//! Common setup code for dispatcher tests.

use std::sync::Arc;

use beacon_queue::Dispatcher;
use beacon_queue_core::{DispatchConfig, ManualClock, RequestRecord, TransportKind};
use beacon_queue_store::{MemoryBackend, RequestStore};
use beacon_queue_transport::{ScriptedTransport, TransportChain};
use rand::RngCore;
use serde_json::json;

/// Endpoint used by fixtures. Nothing ever connects to it.
pub const FIXTURE_ENDPOINT: &str = "http://collect.test/e";

/// Shared storage, a manual clock, and one scripted transport per kind.
///
/// Every dispatcher and store made from one fixture reads and writes the
/// same backend, the way several tabs share browser storage.
pub struct TestFixture {
    pub backend: MemoryBackend,
    pub clock: ManualClock,
    pub beacon: Arc<ScriptedTransport>,
    pub xhr: Arc<ScriptedTransport>,
    pub image: Arc<ScriptedTransport>,
    pub config: DispatchConfig,
}

impl TestFixture {
    /// All transports available and succeeding, beacon disabled.
    pub fn new() -> Self {
        Self::with_config(fixture_config())
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            backend: MemoryBackend::new(),
            clock: ManualClock::default(),
            beacon: ScriptedTransport::succeeding(TransportKind::Beacon),
            xhr: ScriptedTransport::succeeding(TransportKind::Xhr),
            image: ScriptedTransport::succeeding(TransportKind::Image),
            config,
        }
    }

    pub fn chain(&self) -> TransportChain {
        TransportChain::new(self.beacon.clone(), self.xhr.clone(), self.image.clone())
    }

    /// A fresh store handle over the shared backend.
    pub fn store(&self) -> RequestStore<MemoryBackend> {
        RequestStore::new(self.backend.clone())
    }

    /// A dispatcher over the shared backend using the fixture clock.
    pub fn dispatcher(&self) -> Dispatcher<MemoryBackend> {
        Dispatcher::new(self.store(), self.chain(), self.config.clone())
            .with_clock(Arc::new(self.clock.clone()))
    }

    /// Total `send` calls across every transport.
    pub fn total_calls(&self) -> usize {
        self.beacon.call_count() + self.xhr.call_count() + self.image.call_count()
    }

    /// A valid event with a random id.
    pub fn make_event(&self, category: &str, action: &str) -> RequestRecord {
        make_event_with_id(&random_id(), category, action)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The config fixtures start from.
pub fn fixture_config() -> DispatchConfig {
    match DispatchConfig::new(FIXTURE_ENDPOINT) {
        Ok(config) => config,
        Err(e) => panic!("fixture endpoint rejected: {e}"),
    }
}

/// A valid event with a fixed id.
pub fn make_event_with_id(id: &str, category: &str, action: &str) -> RequestRecord {
    RequestRecord::builder(id)
        .category(category)
        .action(action)
        .payload(json!({"fixture": true}))
        .build()
}

/// 16 hex characters of randomness.
pub fn random_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
