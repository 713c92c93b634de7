//! Request body encoding for mutations

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value as Json;

use crate::model::ResourceKind;
use crate::model::Value;

/// Default form field name for an attached file.
pub const DEFAULT_ATTACHMENT_FIELD: &str = "image";

/// A file sent alongside a mutation's scalar fields.
#[derive(Clone, PartialEq)]
pub struct Attachment {
    /// Form field the file is sent under.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment sent under the `image` field.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: DEFAULT_ATTACHMENT_FIELD.to_string(),
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Sets the form field name.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Sets the MIME type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One part of a multipart form body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    /// A scalar field, as text.
    Text { name: String, value: String },
    /// A file.
    File(Attachment),
}

/// An encoded mutation body.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationBody {
    /// `multipart/form-data`, field by field.
    Multipart(Vec<FormPart>),
    /// `application/json`.
    Json(Map<String, Json>),
}

impl MutationBody {
    /// Encodes fields (and an optional file) for a resource kind.
    ///
    /// Attachment-capable kinds, or any request carrying a file, are sent
    /// as multipart with null fields omitted. Other kinds are sent as JSON.
    pub fn encode(
        kind: ResourceKind,
        fields: &BTreeMap<String, Value>,
        attachment: Option<&Attachment>,
    ) -> Self {
        if kind.supports_attachments() || attachment.is_some() {
            let mut parts: Vec<FormPart> = fields
                .iter()
                .filter_map(|(name, value)| {
                    value.text().map(|text| FormPart::Text {
                        name: name.clone(),
                        value: text,
                    })
                })
                .collect();
            if let Some(file) = attachment {
                parts.push(FormPart::File(file.clone()));
            }
            MutationBody::Multipart(parts)
        } else {
            let map = fields
                .iter()
                .map(|(name, value)| (name.clone(), to_json(value)))
                .collect();
            MutationBody::Json(map)
        }
    }

    /// Converts into a reqwest multipart form.
    pub(crate) fn to_form(parts: &[FormPart]) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File(file) => {
                    let mut body = reqwest::multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone());
                    if let Some(mime) = &file.content_type {
                        body = body.mime_str(mime)?;
                    }
                    form.part(file.field.clone(), body)
                }
            };
        }
        Ok(form)
    }
}

fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Json(j) => j.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields() -> BTreeMap<String, Value> {
        let mut fields = BTreeMap::new();
        fields.insert("item_name".to_string(), Value::from("Tripod"));
        fields.insert("condition".to_string(), Value::Null);
        fields.insert("count".to_string(), Value::Int(2));
        fields
    }

    #[test]
    fn test_attachment_kinds_use_multipart_without_file() {
        let body = MutationBody::encode(ResourceKind::Item, &fields(), None);
        assert_eq!(
            body,
            MutationBody::Multipart(vec![
                FormPart::Text { name: "count".into(), value: "2".into() },
                FormPart::Text { name: "item_name".into(), value: "Tripod".into() },
            ])
        );
    }

    #[test]
    fn test_file_is_appended() {
        let file = Attachment::new("t.png", vec![1, 2, 3]).content_type("image/png");
        let body = MutationBody::encode(ResourceKind::Borrower, &fields(), Some(&file));
        match body {
            MutationBody::Multipart(parts) => assert_eq!(parts.last(), Some(&FormPart::File(file))),
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_kinds_use_json() {
        let body = MutationBody::encode(ResourceKind::Transaction, &fields(), None);
        assert_eq!(
            body,
            MutationBody::Json(
                json!({"item_name": "Tripod", "condition": null, "count": 2})
                    .as_object()
                    .unwrap()
                    .clone()
            )
        );
    }

    #[test]
    fn test_form_builds() {
        let parts = vec![
            FormPart::Text { name: "a".into(), value: "b".into() },
            FormPart::File(Attachment::new("f.bin", vec![0]).content_type("application/octet-stream")),
        ];
        assert!(MutationBody::to_form(&parts).is_ok());
    }
}
