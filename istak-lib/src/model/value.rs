//! Value enum for dynamic field values

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// The display sentinel for text fields that resolved to nothing.
pub const NOT_AVAILABLE: &str = "N/A";

/// A scalar (or nullable) field value held by a [`CanonicalRecord`](super::CanonicalRecord).
///
/// # Type Mapping
///
/// | JSON            | Rust Variant |
/// |-----------------|--------------|
/// | null            | `Null`       |
/// | boolean         | `Bool`       |
/// | integral number | `Int`        |
/// | other number    | `Float`      |
/// | string          | `String`     |
/// | array / object  | `Json`       |
///
/// # Example
///
/// ```
/// use istak_lib::model::Value;
///
/// let name = Value::from("Projector");
/// let count = Value::from(3i64);
/// let empty = Value::Null;
/// assert!(empty.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Nested arrays or objects, kept as-is.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a raw JSON value.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::Json(other.clone()),
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a number, if it is numeric or a numeric string.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Renders the value as text, or `None` for null.
    ///
    /// Used for equality filters, free-text search and form encoding.
    pub fn text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Json(j) => Some(j.to_string()),
        }
    }

    /// Returns `true` if the value is null or the display sentinel.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s == NOT_AVAILABLE,
            _ => false,
        }
    }

    /// Interprets the value as a point in time.
    ///
    /// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps
    /// and plain `YYYY-MM-DD` dates. Anything else is `None`.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        let s = self.as_str()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.and_utc());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.text() {
            Some(text) => f.write_str(&text),
            None => f.write_str(NOT_AVAILABLE),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_json(&v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from_json(&json!(7)), Value::Int(7));
        assert_eq!(Value::from_json(&json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from_json(&json!(null)), Value::Null);
        assert_eq!(Value::from_json(&json!([1, 2])), Value::Json(json!([1, 2])));
    }

    #[test]
    fn test_as_datetime_formats() {
        let date = Value::from("2024-03-05").as_datetime().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 5));
        assert!(Value::from("2024-03-05T10:00:00Z").as_datetime().is_some());
        assert!(Value::from("2024-03-05T10:00:00.123").as_datetime().is_some());
        assert!(Value::from(NOT_AVAILABLE).as_datetime().is_none());
        assert!(Value::Null.as_datetime().is_none());
    }

    #[test]
    fn test_absent() {
        assert!(Value::Null.is_absent());
        assert!(Value::from("N/A").is_absent());
        assert!(!Value::from("Good").is_absent());
        assert_eq!(Value::Null.to_string(), "N/A");
    }
}
