//! Priority-ordered transport selection.

use std::sync::Arc;

use beacon_queue_core::{DispatchConfig, RequestRecord, TransportKind};
use tracing::debug;

use crate::beacon::BeaconTransport;
use crate::error::TransportError;
use crate::http::{ClientConfig, HttpTransport};
use crate::pixel::PixelTransport;
use crate::traits::{Target, Transport, TransportOutcome};

/// What happened when the chain was asked to deliver one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Exactly one transport was attempted.
    Attempted {
        kind: TransportKind,
        outcome: TransportOutcome,
    },
    /// No transport in the priority list was detected.
    Unavailable,
}

impl ChainOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ChainOutcome::Attempted { outcome, .. } if outcome.succeeded)
    }

    /// Collapse into a transport outcome; an empty chain is a retryable failure.
    pub fn into_outcome(self) -> TransportOutcome {
        match self {
            ChainOutcome::Attempted { outcome, .. } => outcome,
            ChainOutcome::Unavailable => TransportOutcome::retryable_failure("no transport available"),
        }
    }
}

/// One transport per kind, tried in priority order.
#[derive(Clone)]
pub struct TransportChain {
    beacon: Arc<dyn Transport>,
    xhr: Arc<dyn Transport>,
    image: Arc<dyn Transport>,
}

impl std::fmt::Debug for TransportChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportChain")
            .field("beacon", &self.beacon.kind())
            .field("xhr", &self.xhr.kind())
            .field("image", &self.image.kind())
            .finish()
    }
}

impl TransportChain {
    pub fn new(
        beacon: Arc<dyn Transport>,
        xhr: Arc<dyn Transport>,
        image: Arc<dyn Transport>,
    ) -> Self {
        Self { beacon, xhr, image }
    }

    /// The reqwest-backed chain.
    pub fn http(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(BeaconTransport::new(config)),
            Arc::new(HttpTransport::new(config)),
            Arc::new(PixelTransport::new(config)),
        )
    }

    /// Kinds to try for this config, most capable first.
    pub fn priority(config: &DispatchConfig) -> Vec<TransportKind> {
        if let Some(kind) = config.transport {
            return vec![kind];
        }

        let mut kinds = Vec::with_capacity(3);
        if config.use_send_beacon {
            kinds.push(TransportKind::Beacon);
        }
        kinds.push(TransportKind::Xhr);
        kinds.push(TransportKind::Image);
        kinds
    }

    pub fn get(&self, kind: TransportKind) -> &Arc<dyn Transport> {
        match kind {
            TransportKind::Beacon => &self.beacon,
            TransportKind::Xhr => &self.xhr,
            TransportKind::Image => &self.image,
        }
    }

    /// First detected transport in priority order.
    pub fn select(&self, config: &DispatchConfig) -> Option<&Arc<dyn Transport>> {
        Self::priority(config).into_iter().find_map(|kind| {
            let transport = self.get(kind);
            if transport.detect() {
                Some(transport)
            } else {
                debug!(error = %TransportError::Unavailable(kind), "falling through");
                None
            }
        })
    }

    /// Deliver one record through the first available transport.
    ///
    /// Falls through on detection failure only. Whatever the selected
    /// transport reports is final for this attempt.
    pub async fn attempt(&self, config: &DispatchConfig, record: &RequestRecord) -> ChainOutcome {
        let Some(transport) = self.select(config) else {
            debug!(record_id = %record.id, "no transport available");
            return ChainOutcome::Unavailable;
        };

        let kind = transport.kind();
        debug!(record_id = %record.id, transport = %kind, "transport selected");

        let target = Target::from_config(config);
        let outcome = transport.send(&target, record).await;

        ChainOutcome::Attempted { kind, outcome }
    }
}
