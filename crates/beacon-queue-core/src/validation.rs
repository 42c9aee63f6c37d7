//! Producer-boundary validation.

use serde_json::Value;

use crate::error::RecordError;
use crate::record::RequestRecord;

/// Structural check applied before a record is persisted.
///
/// Only the id is inspected; payloads are opaque to the queue.
pub fn validate_record(record: &RequestRecord) -> Result<(), RecordError> {
    if record.id.is_empty() {
        return Err(RecordError::InvalidRecord("record id is empty".into()));
    }
    Ok(())
}

/// Check that every required meta tag is present and non-empty.
///
/// `null`, empty strings, and whitespace-only strings count as absent.
pub fn validate_required_fields<S: AsRef<str>>(
    record: &RequestRecord,
    required: &[S],
) -> Result<(), RecordError> {
    validate_record(record)?;

    for field in required {
        let field = field.as_ref();
        let present = match record.meta.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(RecordError::MissingRequiredField(field.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REQUIRED_FIELDS;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_valid_event() {
        let record = RequestRecord::builder("r1")
            .category("video")
            .action("seek")
            .build();
        assert!(validate_required_fields(&record, DEFAULT_REQUIRED_FIELDS).is_ok());
    }

    #[test]
    fn test_empty_id_is_invalid_record() {
        let record = RequestRecord::builder("")
            .category("video")
            .action("seek")
            .build();
        assert!(matches!(
            validate_required_fields(&record, DEFAULT_REQUIRED_FIELDS),
            Err(RecordError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_missing_action() {
        let record = RequestRecord::builder("r1").category("video").build();
        assert_eq!(
            validate_required_fields(&record, DEFAULT_REQUIRED_FIELDS),
            Err(RecordError::MissingRequiredField("action".into()))
        );
    }

    #[test]
    fn test_blank_and_null_count_as_missing() {
        let record = RequestRecord::builder("r1")
            .meta("category", json!(null))
            .action("seek")
            .build();
        assert!(validate_required_fields(&record, DEFAULT_REQUIRED_FIELDS).is_err());

        let record = RequestRecord::builder("r1")
            .category("  ")
            .action("seek")
            .build();
        assert!(validate_required_fields(&record, DEFAULT_REQUIRED_FIELDS).is_err());
    }

    #[test]
    fn test_non_string_tags_are_present() {
        let record = RequestRecord::builder("r1")
            .meta("category", json!(3))
            .meta("action", json!({"kind": "seek"}))
            .build();
        assert!(validate_required_fields(&record, DEFAULT_REQUIRED_FIELDS).is_ok());
    }

    #[test]
    fn test_no_required_fields() {
        let record = RequestRecord::builder("r1").build();
        let none: [&str; 0] = [];
        assert!(validate_required_fields(&record, &none).is_ok());
    }

    proptest! {
        #[test]
        fn test_whitespace_tags_always_missing(blank in "[ \t\n]{0,8}", action in "[a-z]{1,8}") {
            let record = RequestRecord::builder("r1")
                .category(blank)
                .action(action)
                .build();
            prop_assert_eq!(
                validate_required_fields(&record, DEFAULT_REQUIRED_FIELDS),
                Err(RecordError::MissingRequiredField("category".into()))
            );
        }
    }
}
