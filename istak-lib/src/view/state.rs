//! The view state of one table

use std::collections::BTreeMap;

use super::ColumnFilter;
use super::Direction;
use super::PageWindow;
use super::Selection;
use super::SortSpec;

/// Sort, filters, query, page window and selection of one table.
///
/// Setters maintain the paging rules: changing a filter or the query
/// returns to the first page, changing the sort does not. Selection is never
/// touched by paging, filtering or sorting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    sort: Option<SortSpec>,
    filters: BTreeMap<String, ColumnFilter>,
    query: String,
    page: PageWindow,
    selection: Selection,
}

impl ViewState {
    /// Creates a state with the given page size and initial sort.
    pub fn new(page_size: usize, sort: Option<SortSpec>) -> Self {
        Self {
            sort,
            page: PageWindow::new(page_size),
            ..Default::default()
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the active sort, if any.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Returns the active column filters.
    pub fn filters(&self) -> &BTreeMap<String, ColumnFilter> {
        &self.filters
    }

    /// Returns the free-text query as typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the query as matched: trimmed and lowercased.
    pub fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }

    /// Returns the page window.
    pub fn page(&self) -> PageWindow {
        self.page
    }

    /// Returns the selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns the selection for mutation.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    // =========================================================================
    // Sort
    // =========================================================================

    /// Replaces the sort. Keeps the current page.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Header-click behavior: flips direction on the sorted field, otherwise
    /// sorts the new field ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = Some(match self.sort.take() {
            Some(spec) if spec.field == field => SortSpec {
                direction: spec.direction.flipped(),
                ..spec
            },
            _ => SortSpec {
                field: field.to_string(),
                direction: Direction::Asc,
            },
        });
    }

    // =========================================================================
    // Filters and query
    // =========================================================================

    /// Sets or clears (`None`) the filter on a column.
    pub fn set_filter(&mut self, field: impl Into<String>, filter: Option<ColumnFilter>) {
        let field = field.into();
        let changed = match filter {
            Some(filter) => self.filters.insert(field, filter.clone()).as_ref() != Some(&filter),
            None => self.filters.remove(&field).is_some(),
        };
        if changed {
            self.page.index = 0;
        }
    }

    /// Sets a column filter from its header value (`"__all__"` clears it).
    pub fn set_filter_value(&mut self, field: impl Into<String>, raw: &str) {
        self.set_filter(field, ColumnFilter::parse(raw));
    }

    /// Removes every column filter.
    pub fn clear_filters(&mut self) {
        if !self.filters.is_empty() {
            self.filters.clear();
            self.page.index = 0;
        }
    }

    /// Sets the free-text query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.page.index = 0;
        }
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Moves to a page. Out-of-range indexes are clamped when projected.
    pub fn set_page(&mut self, index: usize) {
        self.page.index = index;
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, size: usize) {
        self.page = PageWindow::new(size);
    }

    /// Clamps the page index against a row count.
    pub fn clamp_page(&mut self, row_count: usize) {
        self.page.clamp(row_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;

    #[test]
    fn test_filter_and_query_reset_page() {
        let mut state = ViewState::new(10, None);
        state.set_page(3);
        state.set_filter_value("status", "Borrowed");
        assert_eq!(state.page().index(), 0);

        state.set_page(2);
        state.set_query("tri");
        assert_eq!(state.page().index(), 0);

        state.set_page(2);
        state.set_query("tri");
        assert_eq!(state.page().index(), 2, "unchanged query keeps page");
    }

    #[test]
    fn test_sort_keeps_page() {
        let mut state = ViewState::new(10, None);
        state.set_page(4);
        state.toggle_sort("item_name");
        assert_eq!(state.page().index(), 4);
        assert_eq!(state.sort(), Some(&SortSpec::asc("item_name")));
        state.toggle_sort("item_name");
        assert_eq!(state.sort(), Some(&SortSpec::desc("item_name")));
        state.toggle_sort("condition");
        assert_eq!(state.sort(), Some(&SortSpec::asc("condition")));
    }

    #[test]
    fn test_all_clears_filter() {
        let mut state = ViewState::new(10, None);
        state.set_filter_value("condition", "__null__");
        assert_eq!(state.filters().get("condition"), Some(&ColumnFilter::IsNull));
        state.set_filter_value("condition", "__all__");
        assert!(state.filters().is_empty());
    }

    #[test]
    fn test_selection_independent_of_paging() {
        let mut state = ViewState::new(2, None);
        state.selection_mut().toggle(RecordId::from(5));
        state.set_page(1);
        state.set_query("x");
        state.set_filter_value("status", "Available");
        assert!(state.selection().is_selected(&RecordId::from(5)));
    }
}
