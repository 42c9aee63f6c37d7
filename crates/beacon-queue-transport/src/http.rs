//! Credentialed JSON request transport (the "XHR" strategy).
//!
//! Sends the serialized record as the request body with
//! `Content-type: application/json`, carrying cookies for the endpoint.
//! Any 2xx response is a delivery; a non-2xx response or a network error is a
//! retryable failure.

use std::time::Duration;

use async_trait::async_trait;
use beacon_queue_core::{RequestRecord, TransportKind};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::traits::{Target, Transport, TransportOutcome};

/// Settings for the HTTP clients behind the network transports.
///
/// The queue itself enforces no timeout; this is the transport-level one.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("beacon-queue/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Build a reqwest client; `credentials` enables the cookie store.
    pub fn build_client(&self, credentials: bool) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .cookie_store(credentials)
            .build()
            .map_err(|e| TransportError::Client(format!("failed to build HTTP client: {e}")))
    }
}

/// JSON POST transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Option<Client>,
    credentials: bool,
}

impl HttpTransport {
    /// Create a credentialed transport.
    ///
    /// If the client cannot be built the transport still exists but
    /// `detect` reports it unavailable.
    pub fn new(config: &ClientConfig) -> Self {
        let client = match config.build_client(true) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "xhr transport unavailable");
                None
            }
        };
        Self {
            client,
            credentials: true,
        }
    }

    /// Wrap an existing client. The client is assumed to carry credentials.
    pub fn from_client(client: Client) -> Self {
        Self {
            client: Some(client),
            credentials: true,
        }
    }

    /// Mark credential mode as unsupported, forcing fallthrough to the pixel.
    pub fn without_credentials(mut self) -> Self {
        self.credentials = false;
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Xhr
    }

    fn detect(&self) -> bool {
        self.client.is_some() && self.credentials
    }

    async fn send(&self, target: &Target, record: &RequestRecord) -> TransportOutcome {
        let Some(client) = &self.client else {
            return TransportOutcome::retryable_failure("xhr client unavailable");
        };

        let body = match serde_json::to_vec(record) {
            Ok(body) => Bytes::from(body),
            Err(e) => return TransportOutcome::retryable_failure(format!("encoding: {e}")),
        };

        let method = Method::from_bytes(target.method.as_bytes()).unwrap_or(Method::POST);

        debug!(
            record_id = %record.id,
            url = %target.endpoint,
            method = %method,
            "sending request"
        );

        let response = client
            .request(method, target.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                TransportOutcome::delivered_with(response.status().as_u16())
            }
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(record_id = %record.id, status, "endpoint rejected request");
                TransportOutcome::rejected(status)
            }
            Err(e) => {
                debug!(record_id = %record.id, error = %e, "request failed");
                TransportOutcome::retryable_failure(e.to_string())
            }
        }
    }
}
