//! Per-view table configuration

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::AliasTableError;
use crate::model::CanonicalRecord;
use crate::model::ID_FIELD;
use crate::model::ResourceKind;
use crate::model::Value;
use crate::normalize::AliasTable;
use crate::normalize::Derivation;
use crate::normalize::FieldKind;
use crate::normalize::overdue_status;
use crate::normalize::presets;
use crate::view::DEFAULT_PAGE_SIZE;
use crate::view::SortSpec;

/// Decides whether a row may be deleted. Returns the refusal reason, if any.
pub type DeleteGuard = Arc<dyn Fn(&CanonicalRecord) -> Option<String> + Send + Sync>;

/// Configuration for one [`ResourceTable`](super::ResourceTable).
///
/// # Example
///
/// ```
/// use istak_lib::normalize::presets;
/// use istak_lib::table::TableConfig;
/// use istak_lib::view::SortSpec;
///
/// let config = TableConfig::new(presets::borrowers().unwrap())
///     .with_searchable(&["name", "school_id"])
///     .with_default_sort(SortSpec::asc("name"))
///     .with_page_size(25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct TableConfig {
    /// How raw payloads map onto canonical records.
    pub alias_table: Arc<AliasTable>,

    /// Fields the free-text query is matched against.
    ///
    /// Default: none
    pub searchable: Vec<String>,

    /// Fields a user may sort by.
    ///
    /// Default: every non-relation field plus `id`
    pub sortable: Vec<String>,

    /// Sort applied when the table opens.
    ///
    /// Default: none (server order)
    pub default_sort: Option<SortSpec>,

    /// Rows per page.
    ///
    /// Default: 10
    pub page_size: usize,

    /// Refuses deletes of rows in a protected state.
    pub delete_guard: Option<DeleteGuard>,

    /// Rules applied to every record after normalization, in order.
    pub derivations: Vec<Derivation>,
}

impl TableConfig {
    /// Creates a config over an alias table with default settings.
    pub fn new(alias_table: AliasTable) -> Self {
        let sortable = std::iter::once(ID_FIELD.to_string())
            .chain(
                alias_table
                    .fields()
                    .iter()
                    .filter(|f| !matches!(f.kind(), FieldKind::Relation))
                    .map(|f| f.name().to_string()),
            )
            .collect();

        Self {
            alias_table: Arc::new(alias_table),
            searchable: Vec::new(),
            sortable,
            default_sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            delete_guard: None,
            derivations: Vec::new(),
        }
    }

    /// Returns the resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.alias_table.kind()
    }

    /// Sets the searchable fields.
    pub fn with_searchable(mut self, fields: &[&str]) -> Self {
        self.searchable = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Sets the sortable fields.
    pub fn with_sortable(mut self, fields: &[&str]) -> Self {
        self.sortable = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Sets the initial sort.
    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = Some(sort);
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Sets the delete guard.
    pub fn with_delete_guard(
        mut self,
        guard: impl Fn(&CanonicalRecord) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.delete_guard = Some(Arc::new(guard));
        self
    }

    /// Adds a derivation.
    pub fn with_derivation(
        mut self,
        derivation: impl Fn(&mut CanonicalRecord, NaiveDate) + Send + Sync + 'static,
    ) -> Self {
        self.derivations.push(Arc::new(derivation));
        self
    }

    /// Returns `true` if `field` may be sorted by.
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.iter().any(|f| f == field)
    }

    /// Returns the refusal reason if `record` must not be deleted.
    pub fn refuse_delete(&self, record: &CanonicalRecord) -> Option<String> {
        self.delete_guard.as_ref().and_then(|guard| guard(record))
    }

    /// Checks that every referenced field is declared and sortable fields are not relations.
    pub fn validate(&self) -> Result<(), AliasTableError> {
        let table = &self.alias_table;
        for name in &self.searchable {
            if !table.knows(name) {
                return Err(AliasTableError::UnknownField(name.clone()));
            }
        }

        let default_sort = self.default_sort.iter().map(|s| s.field());
        for name in self.sortable.iter().map(String::as_str).chain(default_sort) {
            if !table.knows(name) {
                return Err(AliasTableError::UnknownField(name.to_string()));
            }
            if table
                .field(name)
                .is_some_and(|f| matches!(f.kind(), FieldKind::Relation))
            {
                return Err(AliasTableError::NotSortable(name.to_string()));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Catalog items, most recently returned first.
    pub fn items() -> Result<Self, AliasTableError> {
        Ok(Self::new(presets::items()?)
            .with_searchable(&["item_name", ID_FIELD])
            .with_default_sort(SortSpec::desc("last_transaction_return_date")))
    }

    /// Items listed for QR code printing.
    pub fn qr_targets() -> Result<Self, AliasTableError> {
        Ok(Self::new(presets::qr_targets()?).with_searchable(&["item_name", ID_FIELD]))
    }

    /// Borrowers.
    pub fn borrowers() -> Result<Self, AliasTableError> {
        Ok(Self::new(presets::borrowers()?).with_searchable(&["name", "school_id"]))
    }

    /// Borrow transactions, with overdue status derived and returned rows protected.
    pub fn transactions() -> Result<Self, AliasTableError> {
        Ok(Self::new(presets::transactions()?)
            .with_searchable(&["borrower_name", "school_id", "item_name", ID_FIELD])
            .with_default_sort(SortSpec::asc("status"))
            .with_derivation(overdue_status)
            .with_delete_guard(|record| {
                (record.value_of("status") == Value::from("returned"))
                    .then(|| "Cannot delete a returned transaction.".to_string())
            }))
    }

    /// Returns the preset for a resource kind.
    pub fn preset(kind: ResourceKind) -> Result<Self, AliasTableError> {
        match kind {
            ResourceKind::Item => Self::items(),
            ResourceKind::QrTarget => Self::qr_targets(),
            ResourceKind::Borrower => Self::borrowers(),
            ResourceKind::Transaction => Self::transactions(),
        }
    }
}

impl std::fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableConfig")
            .field("kind", &self.kind())
            .field("searchable", &self.searchable)
            .field("sortable", &self.sortable)
            .field("default_sort", &self.default_sort)
            .field("page_size", &self.page_size)
            .field("delete_guard", &self.delete_guard.is_some())
            .field("derivations", &self.derivations.len())
            .finish()
    }
}
