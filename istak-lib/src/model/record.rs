//! Canonical entity record

use std::collections::BTreeMap;

use super::RecordId;
use super::ResourceKind;
use super::Value;

/// Field name that addresses the record identifier in filters, search and sort.
pub const ID_FIELD: &str = "id";

/// One entity after normalization, regardless of the payload shape it came from.
///
/// Every canonical field declared by the alias table is present in
/// `fields`; unresolved fields hold their declared default, never a gap.
///
/// # Example
///
/// ```
/// use istak_lib::model::{CanonicalRecord, RecordId, ResourceKind};
///
/// let record = CanonicalRecord::new(ResourceKind::Item, RecordId::from(1))
///     .set("item_name", "Projector")
///     .set("condition", "Good");
///
/// assert_eq!(record.get("item_name").and_then(|v| v.as_str()), Some("Projector"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    kind: ResourceKind,
    id: RecordId,
    fields: BTreeMap<String, Value>,
    image: Option<String>,
}

impl CanonicalRecord {
    /// Creates a record with no fields.
    pub fn new(kind: ResourceKind, id: RecordId) -> Self {
        Self {
            kind,
            id,
            fields: BTreeMap::new(),
            image: None,
        }
    }

    /// Returns the resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the server-assigned identifier.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the image URL, if any.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Returns a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns all fields.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Resolves a field by name, treating [`ID_FIELD`] as the identifier.
    ///
    /// Unknown fields resolve to `Null`.
    pub fn value_of(&self, field: &str) -> Value {
        if let Some(value) = self.fields.get(field) {
            return value.clone();
        }
        if field == ID_FIELD {
            return match &self.id {
                RecordId::Int(i) => Value::Int(*i),
                RecordId::Str(s) => Value::String(s.clone()),
            };
        }
        Value::Null
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets the image URL (builder pattern).
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub(crate) fn set_image(&mut self, url: Option<String>) {
        self.image = url;
    }
}
