//! Image-pixel transport.
//!
//! The lowest-capability strategy: a `GET <endpoint>?data=<json>` request,
//! the same request a 1x1 tracking image would make. It needs nothing beyond
//! the ability to issue a GET, so it is always detected. A 2xx response is
//! the image's load event; anything else is its error event.

use async_trait::async_trait;
use beacon_queue_core::{RequestRecord, TransportKind};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::http::ClientConfig;
use crate::traits::{Target, Transport, TransportOutcome};

/// Query parameter carrying the serialized record.
pub const PIXEL_DATA_PARAM: &str = "data";

/// Build the pixel URL for a record.
///
/// Existing query parameters on the endpoint are kept.
pub fn pixel_url(endpoint: &Url, record: &RequestRecord) -> Result<Url> {
    let json = serde_json::to_string(record)?;
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair(PIXEL_DATA_PARAM, &json);
    Ok(url)
}

/// GET-with-query transport.
#[derive(Debug, Clone)]
pub struct PixelTransport {
    client: Option<Client>,
}

impl PixelTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let client = match config.build_client(false) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "pixel client could not be built");
                None
            }
        };
        Self { client }
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }
}

#[async_trait]
impl Transport for PixelTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Image
    }

    fn detect(&self) -> bool {
        true
    }

    async fn send(&self, target: &Target, record: &RequestRecord) -> TransportOutcome {
        let Some(client) = &self.client else {
            return TransportOutcome::retryable_failure("pixel client unavailable");
        };

        let url = match pixel_url(&target.endpoint, record) {
            Ok(url) => url,
            Err(e) => return TransportOutcome::retryable_failure(e.to_string()),
        };

        debug!(record_id = %record.id, url_len = url.as_str().len(), "requesting pixel");

        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                TransportOutcome::delivered_with(response.status().as_u16())
            }
            Ok(response) => TransportOutcome::rejected(response.status().as_u16()),
            Err(e) => TransportOutcome::retryable_failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> RequestRecord {
        RequestRecord::builder("r1")
            .category("video")
            .action("seek")
            .payload(json!({"title": "a & b = c?"}))
            .build()
    }

    #[test]
    fn test_pixel_url_round_trips_payload() {
        let endpoint = Url::parse("https://collect.test/p.gif?site=7").unwrap();
        let record = record();

        let url = pixel_url(&endpoint, &record).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("site".to_string(), "7".to_string()));
        assert_eq!(pairs[1].0, "data");

        let decoded: Value = serde_json::from_str(&pairs[1].1).unwrap();
        assert_eq!(decoded, serde_json::to_value(&record).unwrap());
        // The '&' inside the payload is escaped; only the separator remains.
        assert_eq!(url.as_str().matches('&').count(), 1);
    }

    #[tokio::test]
    async fn test_pixel_request_carries_data_param() {
        let server = MockServer::start().await;
        let record = record();

        Mock::given(method("GET"))
            .and(path("/p.gif"))
            .and(query_param("data", record.to_json().unwrap()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = PixelTransport::new(&ClientConfig::default());
        assert!(transport.detect());

        let target = Target::new(
            Url::parse(&format!("{}/p.gif", server.uri())).unwrap(),
            "POST",
        );
        assert!(transport.send(&target, &record).await.succeeded);
    }

    #[tokio::test]
    async fn test_pixel_error_is_retryable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let transport = PixelTransport::new(&ClientConfig::default());
        let target = Target::new(Url::parse(&server.uri()).unwrap(), "POST");
        let outcome = transport.send(&target, &record()).await;

        assert!(!outcome.succeeded);
        assert!(outcome.retryable);
        assert_eq!(outcome.status, Some(404));
    }
}
