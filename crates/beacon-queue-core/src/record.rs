//! Request records: the unit of delivery.
//!
//! A record is created by a producer, owned by the store until it is
//! delivered, and lent to a transport for the duration of one attempt.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque, producer-supplied record identifier.
///
/// Records in the store are unique by id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty (an empty id is never valid).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Free-form descriptive tags (page id, event category, action, ...).
pub type Meta = BTreeMap<String, Value>;

/// A pending tracking request.
///
/// Serialized in camelCase; this is both the persisted layout and the
/// wire body sent by the transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: RecordId,

    #[serde(default)]
    pub meta: Meta,

    #[serde(default)]
    pub payload: Value,

    /// Unix ms of the first failed delivery attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_time: Option<i64>,

    /// Advisory deferral hint, forwarded untouched.
    #[serde(rename = "async", default = "default_async")]
    pub is_async: bool,
}

fn default_async() -> bool {
    true
}

impl RequestRecord {
    /// Start building a record with the given id.
    pub fn builder(id: impl Into<RecordId>) -> RecordBuilder {
        RecordBuilder::new(id)
    }

    /// Look up a meta tag.
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// Whether a delivery attempt for this record has failed before.
    pub fn has_failed(&self) -> bool {
        self.queue_time.is_some()
    }

    /// Serialize to the JSON wire body.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Builder for [`RequestRecord`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    id: RecordId,
    meta: Meta,
    payload: Value,
    is_async: bool,
}

impl RecordBuilder {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            meta: Meta::new(),
            payload: Value::Null,
            is_async: true,
        }
    }

    /// Set a single meta tag.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the `category` tag.
    pub fn category(self, category: impl Into<String>) -> Self {
        self.meta("category", category.into())
    }

    /// Shorthand for the `action` tag.
    pub fn action(self, action: impl Into<String>) -> Self {
        self.meta("action", action.into())
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn build(self) -> RequestRecord {
        RequestRecord {
            id: self.id,
            meta: self.meta,
            payload: self.payload,
            queue_time: None,
            is_async: self.is_async,
        }
    }
}
