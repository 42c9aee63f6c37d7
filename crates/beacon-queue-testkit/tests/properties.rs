//! End-to-end properties of the dispatcher over scripted transports.

use beacon_queue_core::{Clock, RecordId, RequestRecord};
use beacon_queue_testkit::generators::{outcome, record_batch, record_from_params, RecordParams};
use beacon_queue_testkit::TestFixture;
use beacon_queue_transport::TransportOutcome;
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn ids(records: &[RequestRecord]) -> Vec<RecordId> {
    records.iter().map(|r| r.id.clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Add then all: exactly one record per id, ordered by most recent append.
    #[test]
    fn test_add_then_all_contains_record_once(
        batch in record_batch(12),
        again in any::<RecordParams>(),
    ) {
        let fixture = TestFixture::new();
        let dispatcher = fixture.dispatcher();

        for record in &batch {
            dispatcher.add(record.clone()).unwrap();
        }
        // Re-adding an existing id must not duplicate it.
        if let Some(first) = batch.first() {
            dispatcher.add(record_from_params(first.id.clone(), &again)).unwrap();
        }

        let mut expected = ids(&batch);
        if !expected.is_empty() {
            let first = expected.remove(0);
            expected.push(first);
        }

        let pending = dispatcher.pending().unwrap();
        prop_assert_eq!(ids(&pending), expected);
    }

    /// A pass sends in FIFO order, removes what it delivered, and stops at
    /// the first failure leaving it stamped and everything after untouched.
    #[test]
    fn test_pass_is_fifo_and_stops_at_first_failure(
        batch in record_batch(12),
        script in prop::collection::vec(outcome(), 0..12),
    ) {
        let fixture = TestFixture::new();
        for result in &script {
            fixture.xhr.push_outcome(result.clone());
        }
        let dispatcher = fixture.dispatcher();
        for record in &batch {
            dispatcher.add(record.clone()).unwrap();
        }

        let report = block_on(dispatcher.run()).unwrap();

        let ok = TransportOutcome::delivered();
        let mut expected = script.iter().chain(std::iter::repeat(&ok));
        let delivered = batch
            .iter()
            .take_while(|_| expected.next().map(|o| o.succeeded).unwrap_or(true))
            .count();

        prop_assert_eq!(report.delivered, delivered);

        let batch_ids = ids(&batch);
        let sent: Vec<_> = fixture.xhr.calls().into_iter().map(|c| c.record.id).collect();
        let attempted = (delivered + 1).min(batch.len());
        prop_assert_eq!(&sent[..], &batch_ids[..attempted]);

        let pending = dispatcher.pending().unwrap();
        prop_assert_eq!(ids(&pending), ids(&batch[delivered..]));
        if let Some(head) = pending.first() {
            prop_assert_eq!(report.failed.as_ref(), Some(&head.id));
            prop_assert_eq!(head.queue_time, Some(fixture.clock.now_millis()));
            prop_assert!(pending[1..].iter().all(|r| r.queue_time.is_none()));
        }
        prop_assert_eq!(fixture.image.call_count(), 0);
    }

    /// The first failure time survives any number of later failures.
    #[test]
    fn test_queue_time_is_first_failure(
        params in any::<RecordParams>(),
        retries in 1usize..6,
    ) {
        let fixture = TestFixture::new();
        fixture.xhr.set_default(TransportOutcome::rejected(500));
        let dispatcher = fixture.dispatcher();

        dispatcher.add(record_from_params("r1", &params)).unwrap();
        let first = fixture.clock.now_millis();

        for _ in 0..retries {
            block_on(dispatcher.run()).unwrap();
            fixture.clock.advance(1_000);
        }

        let record = fixture.store().get(&"r1".into()).unwrap().unwrap();
        prop_assert_eq!(record.queue_time, Some(first));
        prop_assert_eq!(fixture.xhr.call_count(), retries);
    }

    /// Suppression drains everything without a single transport call.
    #[test]
    fn test_suppression_never_sends(batch in record_batch(12)) {
        let fixture = TestFixture::new();
        let dispatcher = fixture.dispatcher();
        dispatcher.gate().set(true);

        for record in &batch {
            dispatcher.add(record.clone()).unwrap();
        }
        let report = block_on(dispatcher.run()).unwrap();

        prop_assert_eq!(report.suppressed, batch.len());
        prop_assert_eq!(fixture.total_calls(), 0);
        prop_assert!(dispatcher.pending().unwrap().is_empty());
    }
}
