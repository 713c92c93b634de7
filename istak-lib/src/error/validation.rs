//! Validation error types

use serde_json::Value as Json;

/// Error information for a specific field that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Human-readable validation error message.
    pub message: String,
}

impl FieldValidationError {
    /// Creates a new field validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A 4xx rejection of a mutation, carrying the server's explanation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {status}: {body}")]
pub struct ValidationError {
    status: u16,
    body: String,
    fields: Vec<FieldValidationError>,
}

impl ValidationError {
    /// Builds a validation error from a raw response body.
    ///
    /// Bodies shaped like `{"field": ["message", ...]}` or `{"field": "message"}`
    /// are broken down per field; anything else is kept only as text.
    pub fn from_body(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let fields = match serde_json::from_str::<Json>(&body) {
            Ok(Json::Object(map)) => map
                .iter()
                .flat_map(|(field, messages)| match messages {
                    Json::Array(items) => items
                        .iter()
                        .map(|m| FieldValidationError::new(field, json_text(m)))
                        .collect::<Vec<_>>(),
                    other => vec![FieldValidationError::new(field, json_text(other))],
                })
                .collect(),
            _ => Vec::new(),
        };
        Self { status, body, fields }
    }

    /// HTTP status of the rejection.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The response body, verbatim.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Per-field messages, when the body was structured.
    pub fn fields(&self) -> &[FieldValidationError] {
        &self.fields
    }
}

fn json_text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}
