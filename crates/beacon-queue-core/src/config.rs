//! The configuration surface consumed by the dispatcher.
//!
//! Configuration is owned by an external settings collaborator; the queue
//! only reads it. It can be built in code or parsed from the declarative
//! JSON form:
//!
//! ```json
//! { "endpoint": "https://collect.example.com/e", "useSendBeacon": true, "noSend": false }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Default HTTP method for the XHR transport.
pub const DEFAULT_METHOD: &str = "POST";

/// Meta tags every producer must supply.
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &["category", "action"];

/// The three delivery strategies, in descending capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Beacon,
    Xhr,
    Image,
}

impl TransportKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Beacon => "beacon",
            TransportKind::Xhr => "xhr",
            TransportKind::Image => "image",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatcher configuration.
///
/// Only `endpoint` is required; every other field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    /// Collection endpoint URL.
    pub endpoint: Url,
    /// Opt in to the beacon transport.
    #[serde(default)]
    pub use_send_beacon: bool,
    /// Suppression: accept records but never touch the network.
    #[serde(default)]
    pub no_send: bool,
    /// HTTP method for the XHR transport.
    #[serde(default = "default_method")]
    pub method: String,
    /// Pin a single transport instead of the priority chain.
    #[serde(default)]
    pub transport: Option<TransportKind>,
    /// Meta tags required on every added record.
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

fn default_required_fields() -> Vec<String> {
    DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect()
}

impl DispatchConfig {
    /// Build a config for an endpoint, everything else default.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
        let config = Self {
            endpoint,
            use_send_beacon: false,
            no_send: false,
            method: default_method(),
            transport: None,
            required_fields: default_required_fields(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse the declarative JSON form and validate it.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check endpoint scheme and method.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidEndpoint(format!(
                    "unsupported scheme: {other}"
                )))
            }
        }

        match self.method.to_ascii_uppercase().as_str() {
            "GET" | "POST" => Ok(()),
            _ => Err(ConfigError::InvalidMethod(self.method.clone())),
        }
    }

    pub fn with_send_beacon(mut self, enabled: bool) -> Self {
        self.use_send_beacon = enabled;
        self
    }

    pub fn with_no_send(mut self, suppressed: bool) -> Self {
        self.no_send = suppressed;
        self
    }

    pub fn with_transport(mut self, kind: TransportKind) -> Self {
        self.transport = Some(kind);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}
