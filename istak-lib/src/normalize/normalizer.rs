//! Payload to canonical record mapping

use log::debug;
use log::warn;
use serde_json::Value as Json;

use super::Alias;
use super::AliasTable;
use super::FieldKind;
use crate::model::CanonicalRecord;
use crate::model::RecordId;
use crate::model::Value;

/// Maps one raw payload object to a canonical record.
///
/// Total over any JSON input: every declared field resolves through its
/// aliases (first non-null value wins) or takes its declared default. A
/// payload without an identifier gets [`RecordId::PLACEHOLDER`].
pub fn normalize(raw: &Json, table: &AliasTable) -> CanonicalRecord {
    let id = table
        .id_aliases()
        .iter()
        .find_map(|alias| resolve(raw, alias).and_then(|json| RecordId::from_json(&json)))
        .unwrap_or_else(|| {
            warn!(
                "{} payload has no identifier, using placeholder {}",
                table.kind(),
                RecordId::PLACEHOLDER
            );
            RecordId::PLACEHOLDER
        });

    let mut record = CanonicalRecord::new(table.kind(), id);

    for spec in table.fields() {
        let value = spec
            .aliases()
            .iter()
            .find_map(|alias| resolve_value(raw, alias, spec.kind()))
            .unwrap_or_else(|| spec.default().clone());
        record.insert(spec.name(), value);
    }

    let image = table
        .image_aliases()
        .iter()
        .find_map(|alias| resolve(raw, alias))
        .and_then(|json| match json {
            Json::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        });
    record.set_image(image);

    record
}

/// Maps a list payload to canonical records, preserving order.
///
/// Accepts a bare array or a `{"results": [...]}` pagination envelope. Any
/// other shape yields an empty list.
pub fn normalize_all(payload: &Json, table: &AliasTable) -> Vec<CanonicalRecord> {
    let items: &[Json] = match payload {
        Json::Array(items) => items.as_slice(),
        Json::Object(map) => match map.get("results") {
            Some(Json::Array(items)) => items.as_slice(),
            _ => {
                warn!("{} list payload has no results array", table.kind());
                &[]
            }
        },
        _ => {
            warn!("{} list payload is not an array", table.kind());
            &[]
        }
    };

    debug!("Normalizing {} {} payload(s)", items.len(), table.kind());
    items.iter().map(|raw| normalize(raw, table)).collect()
}

/// Resolves an alias to an owned JSON value, treating absent keys and null as missing.
fn resolve(raw: &Json, alias: &Alias) -> Option<Json> {
    match alias {
        Alias::Path(path) => lookup(raw, path).cloned(),
        Alias::Join(paths) => {
            let parts: Vec<String> = paths
                .iter()
                .filter_map(|p| lookup(raw, p))
                .filter_map(|json| match json {
                    Json::String(s) => Some(s.trim().to_string()),
                    Json::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(Json::String(parts.join(" ")))
            }
        }
    }
}

fn resolve_value(raw: &Json, alias: &Alias, kind: &FieldKind) -> Option<Value> {
    let json = resolve(raw, alias)?;
    let value = Value::from_json(&json);
    match (kind, &value) {
        // Blank strings only count as values for plain text.
        (FieldKind::Text, _) => Some(value),
        (_, Value::String(s)) if s.trim().is_empty() => None,
        (FieldKind::Numeric, Value::String(s)) => Some(match s.trim().parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => s.trim().parse::<f64>().map(Value::Float).unwrap_or(value),
        }),
        _ => Some(value),
    }
}

fn lookup<'a>(raw: &'a Json, path: &[String]) -> Option<&'a Json> {
    let mut current = raw;
    for segment in path {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() { None } else { Some(current) }
}
