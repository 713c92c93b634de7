//! Post-normalization derived fields

use std::sync::Arc;

use chrono::NaiveDate;

use crate::model::CanonicalRecord;
use crate::model::Value;

/// A rule applied to every record after normalization.
///
/// Receives today's date so derivations that depend on time stay testable.
pub type Derivation = Arc<dyn Fn(&mut CanonicalRecord, NaiveDate) + Send + Sync>;

/// Marks borrowed transactions whose return date has passed as `overdue`.
///
/// A missing status is treated as `borrowed`.
pub fn overdue_status(record: &mut CanonicalRecord, today: NaiveDate) {
    let status = match record.get("status") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "borrowed".to_string(),
    };

    let past_due = record
        .get("return_date")
        .and_then(|v| v.as_datetime())
        .is_some_and(|due| due.date_naive() < today);

    let derived = if status == "borrowed" && past_due {
        "overdue".to_string()
    } else {
        status
    };
    record.insert("status", derived);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use crate::model::ResourceKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn transaction(status: Value, return_date: Value) -> CanonicalRecord {
        CanonicalRecord::new(ResourceKind::Transaction, RecordId::from(1))
            .set("status", status)
            .set("return_date", return_date)
    }

    #[test]
    fn test_borrowed_past_due_is_overdue() {
        let mut record = transaction(Value::from("borrowed"), Value::from("2024-06-09"));
        overdue_status(&mut record, today());
        assert_eq!(record.get("status"), Some(&Value::from("overdue")));
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let mut record = transaction(Value::from("borrowed"), Value::from("2024-06-10"));
        overdue_status(&mut record, today());
        assert_eq!(record.get("status"), Some(&Value::from("borrowed")));
    }

    #[test]
    fn test_returned_stays_returned() {
        let mut record = transaction(Value::from("returned"), Value::from("2024-01-01"));
        overdue_status(&mut record, today());
        assert_eq!(record.get("status"), Some(&Value::from("returned")));
    }

    #[test]
    fn test_missing_status_defaults_to_borrowed() {
        let mut record = transaction(Value::Null, Value::Null);
        overdue_status(&mut record, today());
        assert_eq!(record.get("status"), Some(&Value::from("borrowed")));
    }
}
