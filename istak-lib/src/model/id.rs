//! Record identifiers

use serde::Deserialize;
use serde::Serialize;

/// A server-assigned record identifier.
///
/// Integral ids and numeric strings are kept as [`RecordId::Int`] so that
/// `5` and `"5"` from different payload shapes compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric identifier.
    Int(i64),
    /// Opaque string identifier.
    Str(String),
}

impl RecordId {
    /// The placeholder used when a payload carries no identifier at all.
    pub const PLACEHOLDER: RecordId = RecordId::Int(0);

    /// Reads an identifier from a raw JSON value.
    ///
    /// Returns `None` for null, empty strings and non-scalar values.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(RecordId::Int),
            serde_json::Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(Self::from(s))
                }
            }
            _ => None,
        }
    }

    /// Returns `true` if this is the placeholder id.
    pub fn is_placeholder(&self) -> bool {
        *self == Self::PLACEHOLDER
    }

    /// Path segment used in resource URLs.
    pub fn as_path_segment(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(v: i64) -> Self {
        RecordId::Int(v)
    }
}

impl From<i32> for RecordId {
    fn from(v: i32) -> Self {
        RecordId::Int(v as i64)
    }
}

impl From<&str> for RecordId {
    fn from(v: &str) -> Self {
        match v.parse::<i64>() {
            Ok(i) => RecordId::Int(i),
            Err(_) => RecordId::Str(v.to_string()),
        }
    }
}

impl From<String> for RecordId {
    fn from(v: String) -> Self {
        RecordId::from(v.as_str())
    }
}
