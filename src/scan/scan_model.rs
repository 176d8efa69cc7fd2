use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Scan token — opaque per-scan identity supplied by the backend
// ============================================================================

/// Identifies one physical scan event. The backend currently sends a float
/// timestamp, but nothing here depends on that: tokens are only ever
/// compared for equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanToken(Value);

impl ScanToken {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<u64> for ScanToken {
    fn from(value: u64) -> Self {
        ScanToken(Value::from(value))
    }
}

impl From<f64> for ScanToken {
    fn from(value: f64) -> Self {
        ScanToken(Value::from(value))
    }
}

impl From<&str> for ScanToken {
    fn from(value: &str) -> Self {
        ScanToken(Value::from(value))
    }
}

impl std::fmt::Display for ScanToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

// ============================================================================
// Scan record — body of GET /pummeluff/latest/
// ============================================================================

/// The most recently scanned tag as reported by the backend.
///
/// Optional attributes are `None` only when the backend omitted them (or sent
/// `null`). An empty string is a present value and is kept as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireScanRecord")]
pub struct ScanRecord {
    pub uid: String,
    pub alias: Option<String>,
    pub parameter: Option<String>,

    /// Action class assigned to the tag.
    #[serde(rename = "action_class")]
    pub action: Option<String>,

    pub success: bool,
    pub scanned: Option<ScanToken>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct WireScanRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    uid: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    parameter: Option<String>,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    scanned: Option<ScanToken>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    action: ActionClassField,
}

impl From<WireScanRecord> for ScanRecord {
    fn from(wire: WireScanRecord) -> Self {
        Self {
            uid: wire.uid,
            alias: wire.alias,
            parameter: wire.parameter,
            action: wire.action.resolve(),
            success: wire.success,
            scanned: wire.scanned,
            message: wire.message,
        }
    }
}

/// Action class under its current key or one of the names older backends
/// used (`action`, `tag_class`, `type`). Several may be present at once;
/// `action_class` wins, then the newest legacy name.
#[derive(Debug, Default, Deserialize)]
pub struct ActionClassField {
    #[serde(default)]
    action_class: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    tag_class: Option<String>,
    #[serde(default, rename = "type")]
    legacy_type: Option<String>,
}

impl ActionClassField {
    pub fn resolve(self) -> Option<String> {
        self.action_class
            .or(self.action)
            .or(self.tag_class)
            .or(self.legacy_type)
    }
}

impl ScanRecord {
    /// A successful scan of `uid` identified by `scanned`.
    pub fn new(uid: &str, scanned: impl Into<ScanToken>) -> Self {
        Self {
            uid: uid.to_string(),
            alias: None,
            parameter: None,
            action: None,
            success: true,
            scanned: Some(scanned.into()),
            message: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn with_parameter(mut self, parameter: &str) -> Self {
        self.parameter = Some(parameter.to_string());
        self
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Mark the record as a backend-reported failure.
    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
