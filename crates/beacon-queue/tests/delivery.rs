//! End-to-end delivery against a mock collection endpoint.

use std::sync::Arc;
use std::time::Duration;

use beacon_queue::core::ManualClock;
use beacon_queue::store::{MemoryBackend, RequestStore, SqliteBackend};
use beacon_queue::transport::{
    BeaconTransport, ClientConfig, HttpTransport, PixelTransport, ScriptedTransport,
    TransportChain,
};
use beacon_queue::{DispatchConfig, Dispatcher, RequestRecord, TransportKind};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn client_config() -> ClientConfig {
    ClientConfig {
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn config(server: &MockServer) -> DispatchConfig {
    DispatchConfig::new(&format!("{}/collect", server.uri())).unwrap()
}

fn seek_event(id: &str) -> RequestRecord {
    RequestRecord::builder(id)
        .category("video")
        .action("seek")
        .payload(json!({"position": 93, "title": "Intro & outro"}))
        .build()
}

fn http_dispatcher(config: DispatchConfig) -> Dispatcher<MemoryBackend> {
    Dispatcher::new(
        RequestStore::new(MemoryBackend::new()),
        TransportChain::http(&client_config()),
        config,
    )
}

#[tokio::test]
async fn test_server_error_leaves_record_with_queue_time() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let clock = ManualClock::new(1_700_000_123_000);
    let dispatcher = http_dispatcher(config(&server)).with_clock(Arc::new(clock.clone()));

    dispatcher.add(seek_event("r1")).unwrap();
    let report = dispatcher.run().await.unwrap();
    assert_eq!(report.failed.as_ref().map(|id| id.as_str()), Some("r1"));

    let last = dispatcher.store().last().unwrap().unwrap();
    assert_eq!(last.id.as_str(), "r1");
    assert_eq!(last.queue_time, Some(1_700_000_123_000));
}

#[tokio::test]
async fn test_xhr_only_when_beacon_disabled() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collect"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = http_dispatcher(config(&server));
    let report = dispatcher.add_and_run(seek_event("r1")).await.unwrap();

    assert_eq!(report.delivered, 1);
    assert!(dispatcher.pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_pixel_fallback_carries_encoded_record() {
    init_tracing();
    let server = MockServer::start().await;
    let record = seek_event("r1");

    Mock::given(method("GET"))
        .and(path("/collect"))
        .and(query_param("data", record.to_json().unwrap()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cc = client_config();
    let chain = TransportChain::new(
        Arc::new(BeaconTransport::new(&cc)),
        Arc::new(HttpTransport::new(&cc).without_credentials()),
        Arc::new(PixelTransport::new(&cc)),
    );
    let dispatcher = Dispatcher::new(
        RequestStore::new(MemoryBackend::new()),
        chain,
        config(&server),
    );

    let report = dispatcher.add_and_run(record).await.unwrap();
    assert_eq!(report.delivered, 1);
    assert!(dispatcher.pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_accepted_beacon_removes_record_without_other_transports() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let xhr = ScriptedTransport::succeeding(TransportKind::Xhr);
    let image = ScriptedTransport::succeeding(TransportKind::Image);
    let chain = TransportChain::new(
        Arc::new(BeaconTransport::new(&client_config())),
        xhr.clone(),
        image.clone(),
    );
    let dispatcher = Dispatcher::new(
        RequestStore::new(MemoryBackend::new()),
        chain,
        config(&server).with_send_beacon(true),
    );

    let report = dispatcher.add_and_run(seek_event("r1")).await.unwrap();

    assert_eq!(report.delivered, 1);
    assert!(dispatcher.pending().unwrap().is_empty());
    assert_eq!(xhr.detection_count(), 0);
    assert_eq!(xhr.call_count(), 0);
    assert_eq!(image.call_count(), 0);

    // The beacon itself still reaches the endpoint in the background.
    let mut received = Vec::new();
    for _ in 0..100 {
        received = server.received_requests().await.unwrap_or_default();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn test_suppression_makes_no_network_calls() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = http_dispatcher(config(&server).with_no_send(true).with_send_beacon(true));
    dispatcher.add(seek_event("r1")).unwrap();
    dispatcher.add(seek_event("r2")).unwrap();

    let report = dispatcher.run().await.unwrap();
    assert_eq!(report.suppressed, 2);
    assert!(dispatcher.pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_init_does_not_double_send() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = http_dispatcher(config(&server));
    dispatcher.add(seek_event("r1")).unwrap();

    dispatcher.init(config(&server)).unwrap();
    dispatcher.init(config(&server)).unwrap();
    assert_eq!(dispatcher.pending().unwrap().len(), 1);

    dispatcher.run().await.unwrap();
    dispatcher.run().await.unwrap();
    assert!(dispatcher.pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_records_survive_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("beacon.db");

    let offline = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&offline)
        .await;

    {
        let dispatcher = Dispatcher::new(
            RequestStore::new(SqliteBackend::open(&db).unwrap()),
            TransportChain::http(&client_config()),
            config(&offline),
        );
        dispatcher.add(seek_event("r1")).unwrap();
        dispatcher.add(seek_event("r2")).unwrap();
        assert!(dispatcher.run().await.unwrap().failed.is_some());
    }

    let online = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&online)
        .await;

    let dispatcher = Dispatcher::new(
        RequestStore::new(SqliteBackend::open(&db).unwrap()),
        TransportChain::http(&client_config()),
        config(&online),
    );

    let pending = dispatcher.pending().unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending[0].has_failed());
    assert!(!pending[1].has_failed());

    let report = dispatcher.run().await.unwrap();
    assert_eq!(report.delivered, 2);
    assert!(dispatcher.pending().unwrap().is_empty());
}
