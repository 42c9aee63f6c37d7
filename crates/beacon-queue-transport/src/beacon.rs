//! Fire-and-forget beacon transport.
//!
//! A beacon reports only whether the payload was *accepted* for background
//! delivery, never whether it arrived. Acceptance here means the payload fit
//! within [`MAX_BEACON_BYTES`] and a detached POST was spawned on the current
//! tokio runtime. The spawned request outlives the pass that started it and
//! its result is only logged.

use async_trait::async_trait;
use beacon_queue_core::{RequestRecord, TransportKind};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::http::ClientConfig;
use crate::traits::{Target, Transport, TransportOutcome};

/// Largest payload a beacon accepts (the browser queue limit).
pub const MAX_BEACON_BYTES: usize = 64 * 1024;

/// Background POST transport.
#[derive(Debug, Clone)]
pub struct BeaconTransport {
    client: Option<Client>,
    max_bytes: usize,
}

impl BeaconTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let client = match config.build_client(true) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "beacon transport unavailable");
                None
            }
        };
        Self {
            client,
            max_bytes: MAX_BEACON_BYTES,
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client: Some(client),
            max_bytes: MAX_BEACON_BYTES,
        }
    }

    /// Override the acceptance limit.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl Transport for BeaconTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Beacon
    }

    /// Available when a client exists and there is a runtime to spawn onto.
    fn detect(&self) -> bool {
        self.client.is_some() && Handle::try_current().is_ok()
    }

    async fn send(&self, target: &Target, record: &RequestRecord) -> TransportOutcome {
        let (Some(client), Ok(handle)) = (&self.client, Handle::try_current()) else {
            return TransportOutcome::retryable_failure("beacon unavailable");
        };

        let body = match serde_json::to_vec(record) {
            Ok(body) => body,
            Err(e) => return TransportOutcome::retryable_failure(format!("encoding: {e}")),
        };

        if body.len() > self.max_bytes {
            debug!(
                record_id = %record.id,
                size = body.len(),
                limit = self.max_bytes,
                "beacon refused payload"
            );
            return TransportOutcome::retryable_failure(format!(
                "payload of {} bytes exceeds beacon limit",
                body.len()
            ));
        }

        // Beacons are always POST regardless of the configured method.
        let request = client
            .post(target.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(body));
        let record_id = record.id.clone();

        handle.spawn(async move {
            match request.send().await {
                Ok(response) => {
                    debug!(record_id = %record_id, status = response.status().as_u16(), "beacon sent")
                }
                Err(e) => debug!(record_id = %record_id, error = %e, "beacon lost"),
            }
        });

        TransportOutcome::delivered()
    }
}
