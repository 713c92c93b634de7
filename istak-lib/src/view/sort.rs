//! Sort order and comparators

use std::cmp::Ordering;

use chrono::DateTime;
use chrono::Utc;

use crate::model::CanonicalRecord;
use crate::model::ID_FIELD;
use crate::model::Value;
use crate::normalize::AliasTable;
use crate::normalize::FieldKind;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9, oldest first).
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// Sort on a single canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub(crate) field: String,
    pub(crate) direction: Direction,
}

impl SortSpec {
    /// Ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Returns the sorted field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Comparable projection of a field value. `None` sorts last in both directions.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
    Rank(usize, String),
}

impl SortKey {
    fn variant(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Time(_) => 2,
            SortKey::Rank(..) => 3,
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Rank(a, x), SortKey::Rank(b, y)) => a.cmp(b).then_with(|| x.cmp(y)),
            (a, b) => a.variant().cmp(&b.variant()),
        }
    }
}

fn sort_key(kind: Option<&FieldKind>, value: &Value) -> Option<SortKey> {
    if value.is_absent() {
        return None;
    }
    match kind {
        Some(FieldKind::Text) => value.text().map(SortKey::Text),
        Some(FieldKind::Temporal) => value.as_datetime().map(SortKey::Time),
        Some(FieldKind::Numeric) => value.as_f64().map(SortKey::Number),
        Some(FieldKind::Flag) => match value {
            Value::Bool(b) => Some(SortKey::Number(if *b { 1.0 } else { 0.0 })),
            _ => None,
        },
        Some(FieldKind::Status(order)) => {
            let text = value.text()?;
            let rank = order.iter().position(|s| *s == text).unwrap_or(order.len());
            Some(SortKey::Rank(rank, text))
        }
        Some(FieldKind::Relation) => None,
        // Undeclared fields (the identifier) sort numerically when they can.
        None => match value {
            Value::Int(_) | Value::Float(_) => value.as_f64().map(SortKey::Number),
            other => other.text().map(SortKey::Text),
        },
    }
}

/// Stable-sorts `rows` by `spec`, keeping records without a value last.
pub fn sort_rows(rows: &mut [&CanonicalRecord], spec: &SortSpec, table: &AliasTable) {
    let kind = if spec.field == ID_FIELD {
        None
    } else {
        table.field(&spec.field).map(|f| f.kind())
    };

    rows.sort_by(|a, b| {
        let ka = sort_key(kind, &a.value_of(&spec.field));
        let kb = sort_key(kind, &b.value_of(&spec.field));
        match (ka, kb) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => match spec.direction {
                Direction::Asc => x.compare(&y),
                Direction::Desc => y.compare(&x),
            },
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use crate::model::ResourceKind;
    use crate::normalize::FieldSpec;

    fn table() -> AliasTable {
        AliasTable::builder(ResourceKind::Transaction)
            .field(FieldSpec::new("name", FieldKind::Text, &["name"]))
            .field(FieldSpec::new("return_date", FieldKind::Temporal, &["return_date"]))
            .field(FieldSpec::new(
                "status",
                FieldKind::Status(vec!["borrowed".into(), "overdue".into(), "returned".into()]),
                &["status"],
            ))
            .build()
            .unwrap()
    }

    fn rec(id: i64, field: &str, value: Value) -> CanonicalRecord {
        CanonicalRecord::new(ResourceKind::Transaction, RecordId::from(id)).set(field, value)
    }

    fn ids(rows: &[&CanonicalRecord]) -> Vec<RecordId> {
        rows.iter().map(|r| r.id().clone()).collect()
    }

    #[test]
    fn test_null_dates_last_both_directions() {
        let records = vec![
            rec(1, "return_date", Value::Null),
            rec(2, "return_date", Value::from("2024-01-02")),
            rec(3, "return_date", Value::from("2023-12-31")),
        ];
        let mut rows: Vec<_> = records.iter().collect();

        sort_rows(&mut rows, &SortSpec::asc("return_date"), &table());
        assert_eq!(ids(&rows), vec![RecordId::Int(3), RecordId::Int(2), RecordId::Int(1)]);

        sort_rows(&mut rows, &SortSpec::desc("return_date"), &table());
        assert_eq!(ids(&rows), vec![RecordId::Int(2), RecordId::Int(3), RecordId::Int(1)]);
    }

    #[test]
    fn test_status_declared_order() {
        let records = vec![
            rec(1, "status", Value::from("returned")),
            rec(2, "status", Value::from("lost")),
            rec(3, "status", Value::from("borrowed")),
            rec(4, "status", Value::from("overdue")),
        ];
        let mut rows: Vec<_> = records.iter().collect();
        sort_rows(&mut rows, &SortSpec::asc("status"), &table());
        assert_eq!(
            ids(&rows),
            vec![RecordId::Int(3), RecordId::Int(4), RecordId::Int(1), RecordId::Int(2)]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            rec(1, "name", Value::from("b")),
            rec(2, "name", Value::from("a")),
            rec(3, "name", Value::from("b")),
            rec(4, "name", Value::from("a")),
        ];
        let mut rows: Vec<_> = records.iter().collect();
        sort_rows(&mut rows, &SortSpec::asc("name"), &table());
        assert_eq!(
            ids(&rows),
            vec![RecordId::Int(2), RecordId::Int(4), RecordId::Int(1), RecordId::Int(3)]
        );
    }

    #[test]
    fn test_sort_by_identifier() {
        let records = vec![
            CanonicalRecord::new(ResourceKind::Item, RecordId::from(10)),
            CanonicalRecord::new(ResourceKind::Item, RecordId::from(9)),
        ];
        let mut rows: Vec<_> = records.iter().collect();
        sort_rows(&mut rows, &SortSpec::asc(ID_FIELD), &table());
        assert_eq!(ids(&rows), vec![RecordId::Int(9), RecordId::Int(10)]);
    }
}
