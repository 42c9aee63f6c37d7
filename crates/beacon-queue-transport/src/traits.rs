//! Transport trait and the outcome of a single delivery attempt.

use async_trait::async_trait;
use beacon_queue_core::{DispatchConfig, RequestRecord, TransportKind};
use url::Url;

/// Where and how a record is delivered, derived from config once per pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub endpoint: Url,
    pub method: String,
}

impl Target {
    pub fn new(endpoint: Url, method: impl Into<String>) -> Self {
        Self {
            endpoint,
            method: method.into(),
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(config.endpoint.clone(), config.method.to_ascii_uppercase())
    }
}

/// Result of one delivery attempt. Transient, consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOutcome {
    pub succeeded: bool,
    pub retryable: bool,
    /// HTTP status, when the transport saw one.
    pub status: Option<u16>,
    pub reason: Option<String>,
}

impl TransportOutcome {
    /// The record was delivered (or accepted for delivery).
    pub fn delivered() -> Self {
        Self {
            succeeded: true,
            retryable: false,
            status: None,
            reason: None,
        }
    }

    /// Delivered with an observed status code.
    pub fn delivered_with(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::delivered()
        }
    }

    /// Network-level or pixel-level failure; try again on a later pass.
    pub fn retryable_failure(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            retryable: true,
            status: None,
            reason: Some(reason.into()),
        }
    }

    /// The endpoint answered with a non-2xx status.
    pub fn rejected(status: u16) -> Self {
        Self {
            succeeded: false,
            retryable: true,
            status: Some(status),
            reason: Some(format!("HTTP {status}")),
        }
    }
}

/// A delivery strategy.
///
/// `send` resolves exactly once with an outcome and never panics or returns
/// an error; failures are folded into the outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> TransportKind;

    /// Capability probe. A `false` here makes the chain fall through.
    fn detect(&self) -> bool;

    /// Attempt delivery of one record.
    async fn send(&self, target: &Target, record: &RequestRecord) -> TransportOutcome;
}
