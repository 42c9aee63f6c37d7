//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Value};

use beacon_queue_core::{RecordId, RequestRecord, TransportKind};
use beacon_queue_transport::TransportOutcome;

/// Generate a non-empty record id.
pub fn record_id() -> impl Strategy<Value = RecordId> {
    "[a-z0-9]{1,16}".prop_map(RecordId::from)
}

/// Generate a meta tag value (category, action, label).
pub fn tag() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(String::from)
}

/// Generate a small JSON payload, including characters that need
/// URL-encoding in the pixel transport.
pub fn payload() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(|n| json!({ "n": n })),
        "[ -~]{0,40}".prop_map(|s| json!({ "text": s })),
        prop::collection::vec(any::<u16>(), 0..8).prop_map(|v| json!(v)),
    ]
}

pub fn transport_kind() -> impl Strategy<Value = TransportKind> {
    prop_oneof![
        Just(TransportKind::Beacon),
        Just(TransportKind::Xhr),
        Just(TransportKind::Image),
    ]
}

/// A delivery outcome: success, a rejection status, or a network failure.
pub fn outcome() -> impl Strategy<Value = TransportOutcome> {
    prop_oneof![
        3 => Just(TransportOutcome::delivered()),
        1 => prop_oneof![Just(400u16), Just(404), Just(500), Just(503)]
            .prop_map(TransportOutcome::rejected),
        1 => Just(TransportOutcome::retryable_failure("connection reset")),
    ]
}

/// Parameters for generating a record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub payload: Value,
    pub is_async: bool,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (tag(), tag(), proptest::option::of(tag()), payload(), any::<bool>())
            .prop_map(|(category, action, label, payload, is_async)| RecordParams {
                category,
                action,
                label,
                payload,
                is_async,
            })
            .boxed()
    }
}

/// Build a record from parameters under the given id.
pub fn record_from_params(id: impl Into<RecordId>, params: &RecordParams) -> RequestRecord {
    let mut builder = RequestRecord::builder(id)
        .category(params.category.clone())
        .action(params.action.clone())
        .payload(params.payload.clone())
        .is_async(params.is_async);

    if let Some(label) = &params.label {
        builder = builder.meta("label", label.clone());
    }

    builder.build()
}

/// Generate up to `max` records with distinct ids `e0`, `e1`, ...
pub fn record_batch(max: usize) -> impl Strategy<Value = Vec<RequestRecord>> {
    prop::collection::vec(any::<RecordParams>(), 0..=max).prop_map(|params| {
        params
            .iter()
            .enumerate()
            .map(|(i, p)| record_from_params(format!("e{i}"), p))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_queue_core::validate_required_fields;
    use beacon_queue_transport::{pixel_url, PIXEL_DATA_PARAM};
    use url::Url;

    proptest! {
        #[test]
        fn test_generated_records_pass_required_fields(params: RecordParams) {
            let record = record_from_params("r1", &params);
            prop_assert!(validate_required_fields(&record, &["category", "action"]).is_ok());
        }

        #[test]
        fn test_pixel_query_decodes_to_record(params: RecordParams) {
            let record = record_from_params("r1", &params);
            let endpoint: Url = "http://collect.test/p.gif".parse().unwrap();
            let url = pixel_url(&endpoint, &record).unwrap();

            let (key, data) = url.query_pairs().next().unwrap();
            prop_assert_eq!(&*key, PIXEL_DATA_PARAM);
            let decoded: RequestRecord = serde_json::from_str(&data).unwrap();
            prop_assert_eq!(decoded, record);
        }

        #[test]
        fn test_batch_ids_are_unique(batch in record_batch(20)) {
            let mut ids: Vec<_> = batch.iter().map(|r| r.id.clone()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), batch.len());
        }
    }
}
