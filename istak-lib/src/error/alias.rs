//! Alias table validation errors

/// Problems found when validating an alias table at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AliasTableError {
    /// Two canonical fields share a name.
    #[error("Duplicate canonical field '{0}'")]
    DuplicateField(String),

    /// A canonical field has no source keys to try.
    #[error("Canonical field '{0}' has no aliases")]
    NoAliases(String),

    /// An alias path is empty or has an empty segment.
    #[error("Canonical field '{field}' has an invalid alias '{alias}'")]
    InvalidAlias { field: String, alias: String },

    /// A field referenced by the table configuration is not declared.
    #[error("Unknown canonical field '{0}'")]
    UnknownField(String),

    /// A relation field was declared sortable.
    #[error("Canonical field '{0}' cannot be sorted")]
    NotSortable(String),
}
