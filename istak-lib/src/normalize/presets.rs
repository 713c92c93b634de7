//! Alias tables for the backend's resource kinds
//!
//! Key lists cover every payload shape the inventory, borrower, transaction
//! and QR-code views have been observed to receive.

use super::Alias;
use super::AliasTable;
use super::FieldKind;
use super::FieldSpec;
use crate::error::AliasTableError;
use crate::model::ResourceKind;
use crate::model::Value;

/// Item availability, in display order.
pub const ITEM_STATUSES: &[&str] = &["Available", "Borrowed"];

/// Item conditions offered by the filter, best first.
pub const ITEM_CONDITIONS: &[&str] = &["Excellent", "Good", "Fair", "Damaged", "Broken"];

/// Transaction statuses, in sort order.
pub const TRANSACTION_STATUSES: &[&str] = &["borrowed", "overdue", "returned"];

fn status(order: &[&str]) -> FieldKind {
    FieldKind::Status(order.iter().map(|s| s.to_string()).collect())
}

/// Catalog items.
pub fn items() -> Result<AliasTable, AliasTableError> {
    item_fields(ResourceKind::Item)
}

/// Items as QR-code targets.
pub fn qr_targets() -> Result<AliasTable, AliasTableError> {
    item_fields(ResourceKind::QrTarget)
}

fn item_fields(kind: ResourceKind) -> Result<AliasTable, AliasTableError> {
    AliasTable::builder(kind)
        .field(FieldSpec::new("item_name", FieldKind::Text, &["item_name", "name"]))
        .field(FieldSpec::new("status", status(ITEM_STATUSES), &["status"]))
        .field(FieldSpec::new("condition", FieldKind::Text, &["condition"]))
        .field(FieldSpec::new(
            "last_transaction_return_date",
            FieldKind::Temporal,
            &["last_transaction_return_date", "last_borrowed"],
        ))
        .field(FieldSpec::new(
            "current_transaction",
            FieldKind::Relation,
            &["current_transaction"],
        ))
        .image(&["image", "image_url"])
        .build()
}

/// Borrowers.
pub fn borrowers() -> Result<AliasTable, AliasTableError> {
    AliasTable::builder(ResourceKind::Borrower)
        .field(
            FieldSpec::new("name", FieldKind::Text, &["name", "borrower_name", "full_name"])
                .or_alias(Alias::join(&["first_name", "last_name"])),
        )
        .field(FieldSpec::new(
            "school_id",
            FieldKind::Text,
            &["school_id", "borrower_schoolID", "schoolID", "schoolId"],
        ))
        .field(FieldSpec::new("is_active", FieldKind::Flag, &["is_active"]))
        .field(FieldSpec::new(
            "current_borrow_date",
            FieldKind::Temporal,
            &[
                "current_borrow_date",
                "last_borrowed_date",
                "current_transaction.borrow_date",
                "latest_transaction.borrow_date",
            ],
        ))
        .field(FieldSpec::new(
            "return_image",
            FieldKind::Relation,
            &["return_image_url", "return_image", "return_photo"],
        ))
        .image(&["image", "photo", "avatar", "image_url", "photo_url"])
        .build()
}

/// Borrow transactions.
pub fn transactions() -> Result<AliasTable, AliasTableError> {
    AliasTable::builder(ResourceKind::Transaction)
        .field(FieldSpec::new(
            "borrower_name",
            FieldKind::Text,
            &["borrower_name", "borrowerName", "borrower.name"],
        ))
        .field(FieldSpec::new("school_id", FieldKind::Text, &["school_id", "borrower.school_id"]))
        .field(FieldSpec::new("item_name", FieldKind::Text, &["item_name", "item.item_name"]))
        .field(
            FieldSpec::new("items", FieldKind::Relation, &["items"])
                .default_value(Value::Json(serde_json::json!([]))),
        )
        .field(FieldSpec::new("borrow_date", FieldKind::Temporal, &["borrow_date"]))
        .field(FieldSpec::new("return_date", FieldKind::Temporal, &["return_date"]))
        .field(
            FieldSpec::new("status", status(TRANSACTION_STATUSES), &["status"])
                .default_value("borrowed"),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_presets_validate() {
        assert!(items().is_ok());
        assert!(qr_targets().is_ok());
        assert!(borrowers().is_ok());
        assert!(transactions().is_ok());
    }

    #[test]
    fn test_item_payload() {
        let record = normalize(
            &json!({"id": 4, "item_name": "Tripod", "status": "Available", "condition": null, "image": "/media/t.png"}),
            &items().unwrap(),
        );
        assert_eq!(record.get("condition"), Some(&Value::from("N/A")));
        assert_eq!(record.get("last_transaction_return_date"), Some(&Value::Null));
        assert_eq!(record.image(), Some("/media/t.png"));
    }

    #[test]
    fn test_transaction_payload_defaults() {
        let record = normalize(&json!({"id": 9, "borrowerName": "Ana"}), &transactions().unwrap());
        assert_eq!(record.get("borrower_name"), Some(&Value::from("Ana")));
        assert_eq!(record.get("status"), Some(&Value::from("borrowed")));
        assert_eq!(record.get("items"), Some(&Value::Json(json!([]))));
        assert_eq!(record.get("school_id"), Some(&Value::from("N/A")));
    }
}
