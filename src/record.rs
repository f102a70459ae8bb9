//! Data model and JSON persistence for harvested DECODE records.
//!
//! Records are kept as verbatim field maps: the pipeline trusts the remote
//! API's output and only interprets fields when mapping onto the ontology.
use std::fs;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// UTF-8 byte order mark. Some exports of the detail file carry one.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Errors while saving or loading record files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One page of the list endpoint. Envelope fields other than `records` are
/// ignored and a missing `records` array counts as empty.
#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub records: Vec<Summary>,
}

/// Listing-endpoint representation of a record: the id plus whatever partial
/// fields the API returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary {
    pub fields: Map<String, Value>,
}

impl Summary {
    /// The record identifier, if the listing carries one as a string.
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }
}

/// Detail-endpoint representation: the full field map, nested under a
/// `records` key as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub records: Map<String, Value>,
}

impl Detail {
    pub fn id(&self) -> Option<&str> {
        self.records.get("id").and_then(Value::as_str)
    }

    /// A field value, with JSON `null` treated as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.records.get(name).filter(|value| !value.is_null())
    }
}

/// Write records to `path` as an indented JSON array, non-ASCII text preserved.
pub fn save_json<T: Serialize>(records: &[T], path: &str) -> Result<(), StoreError> {
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    Ok(())
}

/// Read the detail file back. If parsing fails and the file starts with a
/// UTF-8 byte order mark, the parse is retried once with the mark stripped;
/// any other failure propagates.
pub fn load_details(path: &str) -> Result<Vec<Detail>, StoreError> {
    let bytes = fs::read(path)?;
    match serde_json::from_slice(&bytes) {
        Ok(records) => Ok(records),
        Err(e) if bytes.starts_with(UTF8_BOM) => {
            warn!("parsing {path} failed ({e}), retrying with the byte order mark stripped");
            Ok(serde_json::from_slice(&bytes[UTF8_BOM.len()..])?)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details() -> Vec<Detail> {
        serde_json::from_value(json!([
            {"records": {"id": "record_1", "name": "Copiale cipher", "start_year": "1730"}},
            {"records": {"id": "record_2", "name": "Brevísimo", "current_country": "España"}}
        ]))
        .unwrap()
    }

    #[test]
    fn round_trip_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("details.json");
        let path = path.to_str().unwrap();
        let records = details();
        save_json(&records, path).unwrap();
        assert_eq!(load_details(path).unwrap(), records);
    }

    #[test]
    fn saved_json_is_indented_and_keeps_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("details.json");
        let path = path.to_str().unwrap();
        save_json(&details(), path).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("[\n  {"), "expected 2-space indent, got: {}", &text[..20]);
        assert!(text.contains("España"), "non-ASCII text must not be escaped");
    }

    #[test]
    fn byte_order_mark_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("details.json");
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(br#"[{"records": {"id": "record_1"}}]"#);
        fs::write(&path, bytes).unwrap();
        let records = load_details(path.to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), Some("record_1"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("details.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_details(path.to_str().unwrap()), Err(StoreError::Json(_))));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(load_details("does/not/exist.json"), Err(StoreError::Io(_))));
    }

    #[test]
    fn null_fields_count_as_absent() {
        let record: Detail = serde_json::from_value(json!({"records": {"id": "r", "author": null}})).unwrap();
        assert!(record.field("author").is_none());
        assert!(record.field("missing").is_none());
        assert_eq!(record.field("id"), Some(&json!("r")));
    }

    #[test]
    fn page_without_records_key_counts_as_empty() {
        let page: Page = serde_json::from_value(json!({"total": 0})).unwrap();
        assert!(page.records.is_empty());
    }

    #[test]
    fn summary_id_requires_a_string() {
        let with: Summary = serde_json::from_value(json!({"id": "record_1", "name": "x"})).unwrap();
        let without: Summary = serde_json::from_value(json!({"name": "x"})).unwrap();
        let numeric: Summary = serde_json::from_value(json!({"id": 7})).unwrap();
        assert_eq!(with.id(), Some("record_1"));
        assert_eq!(without.id(), None);
        assert_eq!(numeric.id(), None);
    }
}
