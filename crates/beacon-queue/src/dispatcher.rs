//! The Dispatcher: single point of control for moving records from the store
//! to "delivered".
//!
//! A dispatch pass walks a snapshot of the store oldest first. Each record
//! goes through the suppression gate and then the transport chain:
//!
//! ```text
//! pending --attempt--> delivered (removed)
//!                 \--> failed (queue time stamped, stays pending, pass stops)
//! ```
//!
//! Nothing here schedules retries. A failed record waits for the next call
//! to [`Dispatcher::run`].

use std::sync::{Arc, PoisonError, RwLock};

use beacon_queue_core::{
    validate_required_fields, Clock, DispatchConfig, RecordId, RequestRecord, SystemClock,
};
use beacon_queue_store::{AppendResult, RequestStore, StorageBackend};
use beacon_queue_transport::{ChainOutcome, TransportChain};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::gate::SuppressionGate;

/// Capacity of the error broadcast channel.
const ERROR_CHANNEL_CAPACITY: usize = 16;

/// Summary of one dispatch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Records removed after a successful send.
    pub delivered: usize,
    /// Records removed without I/O because sending is suppressed.
    pub suppressed: usize,
    /// The record whose failure ended the pass, if any.
    pub failed: Option<RecordId>,
    /// Transport attempts made.
    pub attempted: usize,
    /// Another pass was already running; this call did nothing.
    pub overlapped: bool,
}

impl PassReport {
    fn overlapped() -> Self {
        Self {
            overlapped: true,
            ..Self::default()
        }
    }
}

/// Drains a [`RequestStore`] through a [`TransportChain`].
pub struct Dispatcher<B: StorageBackend> {
    store: Arc<RequestStore<B>>,
    chain: TransportChain,
    config: RwLock<DispatchConfig>,
    gate: SuppressionGate,
    clock: Arc<dyn Clock>,
    /// Held for the duration of a pass.
    pass: Mutex<()>,
    errors: broadcast::Sender<String>,
}

impl<B: StorageBackend> Dispatcher<B> {
    /// Create a dispatcher. Records already in the store stay pending until
    /// the first [`run`](Self::run).
    pub fn new(store: RequestStore<B>, chain: TransportChain, config: DispatchConfig) -> Self {
        Self::with_shared_store(Arc::new(store), chain, config)
    }

    /// Create a dispatcher over a store that other handles also hold.
    pub fn with_shared_store(
        store: Arc<RequestStore<B>>,
        chain: TransportChain,
        config: DispatchConfig,
    ) -> Self {
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Self {
            store,
            chain,
            gate: SuppressionGate::new(config.no_send),
            config: RwLock::new(config),
            clock: Arc::new(SystemClock),
            pass: Mutex::new(()),
            errors,
        }
    }

    /// Use a different clock for queue-time stamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &RequestStore<B> {
        &self.store
    }

    /// A shared handle to the store, e.g. for inspection from another task.
    pub fn store_handle(&self) -> Arc<RequestStore<B>> {
        Arc::clone(&self.store)
    }

    pub fn gate(&self) -> &SuppressionGate {
        &self.gate
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> DispatchConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-read configuration.
    ///
    /// Idempotent. Never touches the store and never starts a pass, so
    /// calling it repeatedly cannot duplicate or resend anything.
    pub fn init(&self, config: DispatchConfig) -> Result<()> {
        config.validate()?;

        info!(
            endpoint = %config.endpoint,
            use_send_beacon = config.use_send_beacon,
            no_send = config.no_send,
            "dispatcher configured"
        );

        self.gate.set(config.no_send);
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    /// Parse the declarative JSON config and apply it.
    ///
    /// A parse failure is returned and also broadcast to every
    /// [`subscribe_errors`](Self::subscribe_errors) receiver. The previous
    /// configuration stays in effect.
    pub fn init_from_json(&self, json: &str) -> Result<()> {
        match DispatchConfig::from_json(json) {
            Ok(config) => self.init(config),
            Err(e) => {
                warn!(error = %e, "rejected dispatcher config");
                // No receivers is not an error.
                let _ = self.errors.send(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Receive configuration errors as they are reported.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<String> {
        self.errors.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Producer API
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and queue a record.
    ///
    /// The record is persisted before this returns. Missing required meta
    /// fields are rejected here and never queued.
    pub fn add(&self, record: RequestRecord) -> Result<AppendResult> {
        let required = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .required_fields
            .clone();
        validate_required_fields(&record, &required)?;

        Ok(self.store.append(record)?)
    }

    /// [`add`](Self::add) followed by [`run`](Self::run).
    pub async fn add_and_run(&self, record: RequestRecord) -> Result<PassReport> {
        self.add(record)?;
        self.run().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one dispatch pass.
    ///
    /// Only one pass runs at a time. A call that overlaps a running pass
    /// returns immediately with `overlapped` set. Records appended after the
    /// running pass took its snapshot wait for the next call.
    pub async fn run(&self) -> Result<PassReport> {
        let Ok(_pass) = self.pass.try_lock() else {
            debug!("dispatch pass already running");
            return Ok(PassReport::overlapped());
        };

        let config = self.config();
        let snapshot = self.store.all()?;
        let mut report = PassReport::default();

        for record in snapshot {
            // Another handle on the same storage may have delivered it.
            if self.store.get(&record.id)?.is_none() {
                debug!(record_id = %record.id, "record gone before attempt");
                continue;
            }

            if self.gate.is_suppressed() {
                self.store.remove(&record.id)?;
                debug!(record_id = %record.id, "send suppressed");
                report.suppressed += 1;
                continue;
            }

            report.attempted += 1;
            let result = self.chain.attempt(&config, &record).await;

            if result.succeeded() {
                self.store.remove(&record.id)?;
                if let ChainOutcome::Attempted { kind, .. } = &result {
                    info!(record_id = %record.id, transport = %kind, "record delivered");
                }
                report.delivered += 1;
                continue;
            }

            let outcome = result.into_outcome();
            let queue_time = self.store.mark_failed(&record.id, self.clock.now_millis())?;
            warn!(
                record_id = %record.id,
                status = ?outcome.status,
                reason = outcome.reason.as_deref().unwrap_or("unknown"),
                queue_time = ?queue_time,
                "delivery failed"
            );
            report.failed = Some(record.id);
            break;
        }

        info!(
            delivered = report.delivered,
            suppressed = report.suppressed,
            failed = report.failed.is_some(),
            pending = self.store.len()?,
            "dispatch pass complete"
        );

        Ok(report)
    }

    /// Start a pass in the background.
    pub fn spawn_run(self: Arc<Self>) -> JoinHandle<Result<PassReport>>
    where
        B: 'static,
    {
        tokio::spawn(async move { self.run().await })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Pending records, oldest first.
    pub fn pending(&self) -> Result<Vec<RequestRecord>> {
        Ok(self.store.all()?)
    }

    /// Drop every pending record.
    pub fn reset(&self) -> Result<()> {
        Ok(self.store.clear()?)
    }
}
