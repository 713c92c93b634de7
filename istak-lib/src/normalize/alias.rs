//! Declared field alias tables

use std::collections::HashSet;

use crate::error::AliasTableError;
use crate::model::ResourceKind;
use crate::model::Value;
use crate::model::NOT_AVAILABLE;

/// One source location to check for a canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alias {
    /// A key, or a dotted path into nested objects (`current_transaction.borrow_date`).
    Path(Vec<String>),
    /// Several paths whose text values are joined with a space
    /// (`first_name` + `last_name`). Resolves only when the joined text is non-empty.
    Join(Vec<Vec<String>>),
}

impl Alias {
    /// Creates a key or dotted-path alias.
    pub fn path(path: &str) -> Self {
        Alias::Path(split_path(path))
    }

    /// Creates a joined alias over several keys or paths.
    pub fn join(paths: &[&str]) -> Self {
        Alias::Join(paths.iter().map(|p| split_path(p)).collect())
    }

    fn is_valid(&self) -> bool {
        let valid_path = |p: &Vec<String>| !p.is_empty() && p.iter().all(|s| !s.is_empty());
        match self {
            Alias::Path(p) => valid_path(p),
            Alias::Join(paths) => !paths.is_empty() && paths.iter().all(valid_path),
        }
    }
}

impl std::fmt::Display for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alias::Path(p) => f.write_str(&p.join(".")),
            Alias::Join(paths) => {
                let parts: Vec<String> = paths.iter().map(|p| p.join(".")).collect();
                write!(f, "{}", parts.join(" + "))
            }
        }
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(|s| s.to_string()).collect()
}

/// How a canonical field is interpreted for defaults and ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Display text. Defaults to `"N/A"`, sorts lexicographically.
    Text,
    /// Date or timestamp. Defaults to null, sorts chronologically with nulls last.
    Temporal,
    /// Number. Defaults to null, sorts numerically.
    Numeric,
    /// Boolean flag. Defaults to null, sorts `false` before `true`.
    Flag,
    /// Enumerated status with a declared total order; unknown values sort after known ones.
    Status(Vec<String>),
    /// Optional relation or nested payload. Defaults to null, not sortable by value.
    Relation,
}

impl FieldKind {
    /// The value an unresolved field of this kind takes.
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Text => Value::String(NOT_AVAILABLE.to_string()),
            _ => Value::Null,
        }
    }
}

/// Declaration of one canonical field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) aliases: Vec<Alias>,
    pub(crate) kind: FieldKind,
    pub(crate) default: Value,
}

impl FieldSpec {
    /// Declares a field probing the given keys in order.
    pub fn new(name: impl Into<String>, kind: FieldKind, aliases: &[&str]) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.iter().map(|a| Alias::path(a)).collect(),
            default: kind.default_value(),
            kind,
        }
    }

    /// Appends an alias to try after the existing ones.
    pub fn or_alias(mut self, alias: Alias) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Overrides the default for an unresolved field.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// The canonical field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The aliases, in lookup order.
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// The value used when no alias resolves.
    pub fn default(&self) -> &Value {
        &self.default
    }
}

/// The validated set of canonical fields for one resource kind.
///
/// Built with [`AliasTable::builder`]; construction fails on duplicate
/// fields, fields without aliases, or malformed alias paths, so a bad table
/// is caught when the view is configured rather than when a payload is read.
///
/// # Example
///
/// ```
/// use istak_lib::model::ResourceKind;
/// use istak_lib::normalize::{AliasTable, FieldKind, FieldSpec};
///
/// let table = AliasTable::builder(ResourceKind::Item)
///     .field(FieldSpec::new("item_name", FieldKind::Text, &["item_name", "name"]))
///     .image(&["image", "image_url"])
///     .build()
///     .unwrap();
///
/// assert!(table.field("item_name").is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    kind: ResourceKind,
    id_aliases: Vec<Alias>,
    image_aliases: Vec<Alias>,
    fields: Vec<FieldSpec>,
}

impl AliasTable {
    /// Starts a table for the given resource kind.
    ///
    /// The identifier checks `id` then `pk` unless overridden.
    pub fn builder(kind: ResourceKind) -> AliasTableBuilder {
        AliasTableBuilder {
            kind,
            id_aliases: vec![Alias::path("id"), Alias::path("pk")],
            image_aliases: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Returns the resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the identifier aliases.
    pub fn id_aliases(&self) -> &[Alias] {
        &self.id_aliases
    }

    /// Returns the image aliases (empty when the kind has no image).
    pub fn image_aliases(&self) -> &[Alias] {
        &self.image_aliases
    }

    /// Returns the declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field declaration by canonical name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if `name` is a declared field or the identifier.
    pub fn knows(&self, name: &str) -> bool {
        name == crate::model::ID_FIELD || self.field(name).is_some()
    }
}

/// Builder for [`AliasTable`].
#[derive(Debug, Clone)]
pub struct AliasTableBuilder {
    kind: ResourceKind,
    id_aliases: Vec<Alias>,
    image_aliases: Vec<Alias>,
    fields: Vec<FieldSpec>,
}

impl AliasTableBuilder {
    /// Replaces the identifier aliases.
    pub fn id(mut self, aliases: &[&str]) -> Self {
        self.id_aliases = aliases.iter().map(|a| Alias::path(a)).collect();
        self
    }

    /// Declares the image reference aliases.
    pub fn image(mut self, aliases: &[&str]) -> Self {
        self.image_aliases = aliases.iter().map(|a| Alias::path(a)).collect();
        self
    }

    /// Declares a canonical field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Validates and builds the table.
    pub fn build(self) -> Result<AliasTable, AliasTableError> {
        if self.id_aliases.is_empty() {
            return Err(AliasTableError::NoAliases(crate::model::ID_FIELD.to_string()));
        }
        for alias in self.id_aliases.iter().chain(&self.image_aliases) {
            if !alias.is_valid() {
                return Err(AliasTableError::InvalidAlias {
                    field: crate::model::ID_FIELD.to_string(),
                    alias: alias.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for spec in &self.fields {
            if spec.name.is_empty() || spec.name == crate::model::ID_FIELD {
                return Err(AliasTableError::InvalidAlias {
                    field: spec.name.clone(),
                    alias: String::new(),
                });
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(AliasTableError::DuplicateField(spec.name.clone()));
            }
            if spec.aliases.is_empty() {
                return Err(AliasTableError::NoAliases(spec.name.clone()));
            }
            if let Some(bad) = spec.aliases.iter().find(|a| !a.is_valid()) {
                return Err(AliasTableError::InvalidAlias {
                    field: spec.name.clone(),
                    alias: bad.to_string(),
                });
            }
        }

        Ok(AliasTable {
            kind: self.kind,
            id_aliases: self.id_aliases,
            image_aliases: self.image_aliases,
            fields: self.fields,
        })
    }
}
