//! Column filters and free-text matching

use crate::model::CanonicalRecord;
use crate::model::Value;

/// Filter value meaning "no filter" on a column.
pub const FILTER_ALL: &str = "__all__";

/// Filter value matching records whose field is null or `"N/A"`.
pub const FILTER_NULL: &str = "__null__";

/// An equality predicate on one column.
///
/// # Example
///
/// ```
/// use istak_lib::model::Value;
/// use istak_lib::view::ColumnFilter;
///
/// assert_eq!(ColumnFilter::parse("__all__"), None);
/// assert_eq!(ColumnFilter::parse("__null__"), Some(ColumnFilter::IsNull));
///
/// let filter = ColumnFilter::parse("Good").unwrap();
/// assert!(filter.matches(&Value::from("Good")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// `field == value`, compared by rendered text.
    Equals(Value),
    /// Field is null or the display sentinel.
    IsNull,
}

impl ColumnFilter {
    /// Creates an equality filter.
    pub fn eq(value: impl Into<Value>) -> Self {
        ColumnFilter::Equals(value.into())
    }

    /// Parses a filter as selected in a column header.
    ///
    /// Returns `None` for [`FILTER_ALL`], meaning the column is unfiltered.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            FILTER_ALL => None,
            FILTER_NULL => Some(ColumnFilter::IsNull),
            other => Some(ColumnFilter::Equals(Value::from(other))),
        }
    }

    /// Tests a field value against the filter.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ColumnFilter::IsNull => value.is_absent(),
            ColumnFilter::Equals(expected) => match (expected.text(), value.text()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => true,
                _ => false,
            },
        }
    }
}

/// Returns `true` if any of `fields` contains `needle` case-insensitively.
///
/// `needle` must already be lowercased. An empty needle matches everything.
pub fn matches_query(record: &CanonicalRecord, fields: &[String], needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|field| {
        record
            .value_of(field)
            .text()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use crate::model::ResourceKind;

    #[test]
    fn test_equals_compares_text() {
        assert!(ColumnFilter::eq("5").matches(&Value::Int(5)));
        assert!(!ColumnFilter::eq("Good").matches(&Value::from("good")));
        assert!(!ColumnFilter::eq("Good").matches(&Value::Null));
    }

    #[test]
    fn test_null_filter() {
        assert!(ColumnFilter::IsNull.matches(&Value::Null));
        assert!(ColumnFilter::IsNull.matches(&Value::from("N/A")));
        assert!(!ColumnFilter::IsNull.matches(&Value::from("Fair")));
    }

    #[test]
    fn test_query_matches_any_field() {
        let record = CanonicalRecord::new(ResourceKind::Borrower, RecordId::from(42))
            .set("name", "Ana Cruz")
            .set("school_id", "S-100");
        let fields = vec!["name".to_string(), "school_id".to_string(), "id".to_string()];
        assert!(matches_query(&record, &fields, "cruz"));
        assert!(matches_query(&record, &fields, "s-1"));
        assert!(matches_query(&record, &fields, "42"));
        assert!(!matches_query(&record, &fields, "bob"));
        assert!(matches_query(&record, &fields, ""));
    }
}
