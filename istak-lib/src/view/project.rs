//! Filter, query, sort, paginate

use log::trace;

use super::Projection;
use super::ViewState;
use super::filter::matches_query;
use super::page::page_count;
use super::sort::sort_rows;
use crate::model::CanonicalRecord;
use crate::normalize::AliasTable;

/// Derives the visible page from `records` and `state`.
///
/// Steps run in a fixed order: column filters, then the free-text query
/// over `searchable` fields, then a stable sort, then pagination. The
/// result depends only on the inputs; nothing is memoized.
///
/// # Example
///
/// ```
/// use istak_lib::model::{CanonicalRecord, RecordId, ResourceKind};
/// use istak_lib::normalize::presets;
/// use istak_lib::view::{project, ViewState};
///
/// let table = presets::items().unwrap();
/// let records = vec![
///     CanonicalRecord::new(ResourceKind::Item, RecordId::from(1)).set("status", "Available"),
///     CanonicalRecord::new(ResourceKind::Item, RecordId::from(2)).set("status", "Borrowed"),
/// ];
///
/// let mut state = ViewState::new(10, None);
/// state.set_filter_value("status", "Borrowed");
///
/// let page = project(&records, &state, &table, &[]);
/// assert_eq!(page.row_count(), 1);
/// assert_eq!(page.rows()[0].id(), &RecordId::from(2));
/// ```
pub fn project<'a>(
    records: &'a [CanonicalRecord],
    state: &ViewState,
    table: &AliasTable,
    searchable: &[String],
) -> Projection<'a> {
    let needle = state.normalized_query();

    let mut rows: Vec<&CanonicalRecord> = records
        .iter()
        .filter(|record| {
            state
                .filters()
                .iter()
                .all(|(field, filter)| filter.matches(&record.value_of(field)))
        })
        .filter(|record| matches_query(record, searchable, &needle))
        .collect();

    if let Some(spec) = state.sort() {
        sort_rows(&mut rows, spec, table);
    }

    let row_count = rows.len();
    let window = state.page();
    let pages = page_count(row_count, window.size());
    let index = window.index().min(pages - 1);
    let start = index * window.size();

    let page: Vec<&CanonicalRecord> = rows.into_iter().skip(start).take(window.size()).collect();

    trace!(
        "Projected {} of {} {} record(s), page {}/{}",
        page.len(),
        row_count,
        table.kind(),
        index + 1,
        pages
    );

    Projection::new(page, row_count, pages, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use crate::model::ResourceKind;
    use crate::model::Value;
    use crate::normalize::presets;
    use crate::view::SortSpec;

    fn item(id: i64, name: &str, status: &str, date: Option<&str>) -> CanonicalRecord {
        CanonicalRecord::new(ResourceKind::Item, RecordId::from(id))
            .set("item_name", name)
            .set("status", status)
            .set("last_transaction_return_date", date.map(Value::from))
    }

    fn searchable() -> Vec<String> {
        vec!["item_name".to_string(), "id".to_string()]
    }

    #[test]
    fn test_filter_before_sort() {
        let table = presets::items().unwrap();
        let records = vec![item(1, "A", "x", None), item(2, "B", "y", None)];
        for sort in [None, Some(SortSpec::asc("item_name")), Some(SortSpec::desc("item_name"))] {
            let mut state = ViewState::new(10, sort);
            state.set_filter_value("status", "y");
            let page = project(&records, &state, &table, &searchable());
            assert_eq!(page.ids(), vec![RecordId::from(2)]);
        }
    }

    #[test]
    fn test_row_count_ignores_page() {
        let table = presets::items().unwrap();
        let records: Vec<_> = (1..=25).map(|i| item(i, &format!("Item {i}"), "Available", None)).collect();
        let mut state = ViewState::new(10, None);
        state.set_page(2);
        let page = project(&records, &state, &table, &searchable());
        assert_eq!(page.row_count(), 25);
        assert_eq!(page.page_count(), 3);
        assert_eq!(page.rows().len(), 5);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_empty_projection() {
        let table = presets::items().unwrap();
        let mut state = ViewState::new(10, None);
        state.set_page(5);
        let page = project(&[], &state, &table, &searchable());
        assert_eq!(page.row_count(), 0);
        assert_eq!(page.page_count(), 1);
        assert_eq!(page.page_index(), 0);
        assert!(page.rows().is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive_and_trimmed() {
        let table = presets::items().unwrap();
        let records = vec![item(1, "Tripod", "Available", None), item(2, "Camera", "Available", None)];
        let mut state = ViewState::new(10, None);
        state.set_query("  TRI ");
        let page = project(&records, &state, &table, &searchable());
        assert_eq!(page.ids(), vec![RecordId::from(1)]);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let table = presets::items().unwrap();
        let records = vec![
            item(1, "b", "Available", Some("2024-01-01")),
            item(2, "a", "Borrowed", None),
            item(3, "c", "Available", Some("2024-02-01")),
        ];
        let state = ViewState::new(2, Some(SortSpec::desc("last_transaction_return_date")));
        let first = project(&records, &state, &table, &searchable());
        let second = project(&records, &state, &table, &searchable());
        assert_eq!(first, second);
        assert_eq!(first.ids(), vec![RecordId::from(3), RecordId::from(1)]);
    }
}
