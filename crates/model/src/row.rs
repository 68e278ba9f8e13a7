//! Flattened rows
//!
//! A flattened row exposes nested record fields at top level under
//! `*_flat` keys so the grid can filter, sort and render without knowing
//! the record's shape.

use roster_core::CellValue;
use serde::Serialize;
use std::collections::BTreeMap;

static NULL_CELL: CellValue = CellValue::Null;

/// A read-only projection of one record
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FlatRow {
    /// Identity key of the source record
    pub id: Option<String>,

    /// Position of the source record in the fetched list
    pub source_index: usize,

    fields: BTreeMap<String, CellValue>,
}

impl FlatRow {
    /// Create an empty row for the record at `source_index`
    pub fn new(id: Option<String>, source_index: usize) -> Self {
        Self {
            id,
            source_index,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Set a field using builder pattern
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a field; missing fields read as null
    pub fn get(&self, key: &str) -> &CellValue {
        self.fields.get(key).unwrap_or(&NULL_CELL)
    }

    /// Get a field coerced to text
    pub fn text(&self, key: &str) -> String {
        self.get(key).as_text()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_null() {
        let row = FlatRow::new(None, 0).with("name_flat", "Ann");
        assert_eq!(row.text("name_flat"), "Ann");
        assert!(row.get("zip_flat").is_null());
        assert_eq!(row.text("zip_flat"), "");
        assert!(!row.contains_key("zip_flat"));
    }

    #[test]
    fn test_keys_sorted() {
        let row = FlatRow::new(Some("1".to_string()), 3)
            .with("zip_flat", "")
            .with("is_active_flat", true)
            .with("city_id_flat", None::<String>);
        let keys: Vec<_> = row.keys().collect();
        assert_eq!(keys, vec!["city_id_flat", "is_active_flat", "zip_flat"]);
        assert_eq!(row.len(), 3);
        assert_eq!(row.source_index, 3);
    }
}
