//! A scripted in-memory transport for testing.
//!
//! Outcomes are queued ahead of time; once the script runs out the default
//! outcome is returned. Every `send` is recorded so tests can assert on what
//! was attempted and in which order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use beacon_queue_core::{RequestRecord, TransportKind};

use crate::traits::{Target, Transport, TransportOutcome};

/// One recorded `send` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRequest {
    pub target: Target,
    pub record: RequestRecord,
}

/// Transport double with scripted outcomes and toggleable detection.
#[derive(Debug)]
pub struct ScriptedTransport {
    kind: TransportKind,
    available: AtomicBool,
    script: Mutex<VecDeque<TransportOutcome>>,
    default: Mutex<TransportOutcome>,
    calls: Mutex<Vec<SentRequest>>,
    detections: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(kind: TransportKind, default: TransportOutcome) -> Self {
        Self {
            kind,
            available: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            default: Mutex::new(default),
            calls: Mutex::new(Vec::new()),
            detections: AtomicUsize::new(0),
        }
    }

    /// Available, and delivers everything.
    pub fn succeeding(kind: TransportKind) -> Arc<Self> {
        Arc::new(Self::new(kind, TransportOutcome::delivered()))
    }

    /// Available, and fails everything with a retryable error.
    pub fn failing(kind: TransportKind) -> Arc<Self> {
        Arc::new(Self::new(
            kind,
            TransportOutcome::retryable_failure("scripted failure"),
        ))
    }

    /// Never detected.
    pub fn unavailable(kind: TransportKind) -> Arc<Self> {
        let transport = Self::new(kind, TransportOutcome::delivered());
        transport.set_available(false);
        Arc::new(transport)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Queue an outcome for the next unscripted `send`.
    pub fn push_outcome(&self, outcome: TransportOutcome) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Outcome used once the script is exhausted.
    pub fn set_default(&self, outcome: TransportOutcome) {
        *self.default.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    /// Every `send` so far, oldest first.
    pub fn calls(&self) -> Vec<SentRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// How many times `detect` was probed.
    pub fn detection_count(&self) -> usize {
        self.detections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn detect(&self) -> bool {
        self.detections.fetch_add(1, Ordering::SeqCst);
        self.available.load(Ordering::SeqCst)
    }

    async fn send(&self, target: &Target, record: &RequestRecord) -> TransportOutcome {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentRequest {
                target: target.clone(),
                record: record.clone(),
            });

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match scripted {
            Some(outcome) => outcome,
            None => self
                .default
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
