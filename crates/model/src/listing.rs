//! Listing payloads
//!
//! The listing endpoints answer `GET /api/<entity>?userType=<Type>` with
//! `{ "users": [...] }` (or `{ "patients": [...] }` for the patients
//! endpoint). Snapshots saved from those endpoints are parsed here.

use crate::record::Record;
use roster_core::{RosterError, RosterResult, UserType};
use serde_json::Value;
use std::path::Path;

/// Parse a listing payload into records
///
/// Accepts the user type's own envelope or a bare array. Array elements
/// that are not objects are skipped.
pub fn parse_listing(json: &str, user_type: UserType) -> RosterResult<Vec<Record>> {
    let value: Value = serde_json::from_str(json)?;
    listing_from_value(value, user_type)
}

/// Interpret an already-parsed listing payload
pub fn listing_from_value(value: Value, user_type: UserType) -> RosterResult<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(user_type.listing_key()) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(RosterError::InvalidListing(format!(
                    "expected a '{}' array",
                    user_type.listing_key()
                )));
            }
        },
        other => {
            return Err(RosterError::InvalidListing(format!(
                "expected an array or object, found {}",
                type_name(&other)
            )));
        }
    };

    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter(Value::is_object)
        .map(Record::new)
        .collect();

    if records.len() != total {
        tracing::warn!(
            "Skipped {} non-object entries in {} listing",
            total - records.len(),
            user_type
        );
    }
    tracing::debug!("Parsed {} {} records", records.len(), user_type);

    Ok(records)
}

/// Load a listing snapshot from disk
pub fn load_listing(path: impl AsRef<Path>, user_type: UserType) -> RosterResult<Vec<Record>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| RosterError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_listing(&json, user_type)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_users_envelope() {
        let records = parse_listing(
            r#"{"users": [{"id": 1, "admin": {"name": "Bob"}}, {"id": 2}]}"#,
            UserType::Admin,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text_field(UserType::Admin, "name"), "Bob");
    }

    #[test]
    fn test_parse_patients_envelope() {
        let records =
            parse_listing(r#"{"patients": [{"id": 1}]}"#, UserType::Patient).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_rejects_other_screen_envelope() {
        let err = parse_listing(r#"{"users": [{"id": 1}]}"#, UserType::Patient).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid listing payload: expected a 'patients' array"
        );

        let err = parse_listing(r#"{"patients": [{"id": 1}]}"#, UserType::Nurse).unwrap_err();
        assert!(matches!(err, RosterError::InvalidListing(_)));

        let err = parse_listing(r#"{"data": [{"id": 1}]}"#, UserType::Admin).unwrap_err();
        assert!(matches!(err, RosterError::InvalidListing(_)));
    }

    #[test]
    fn test_parse_bare_array_skips_non_objects() {
        let records = parse_listing(r#"[{"id": 1}, 5, null, {"id": 2}]"#, UserType::Nurse).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].identity(UserType::Nurse), Some("2".to_string()));
    }

    #[test]
    fn test_parse_invalid_listing() {
        let err = parse_listing(r#"{"rows": []}"#, UserType::Admin).unwrap_err();
        assert!(matches!(err, RosterError::InvalidListing(_)));

        let err = parse_listing(r#"{"users": "nope"}"#, UserType::Admin).unwrap_err();
        assert!(matches!(err, RosterError::InvalidListing(_)));

        let err = parse_listing(r#""nope""#, UserType::Admin).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid listing payload: expected an array or object, found string"
        );

        let err = parse_listing("{", UserType::Admin).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_load_listing_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"users": [{{"id": 3}}]}}"#).unwrap();
        let records = load_listing(file.path(), UserType::Technician).unwrap();
        assert_eq!(records.len(), 1);

        let err = load_listing("/nonexistent/listing.json", UserType::Admin).unwrap_err();
        assert!(err.is_io());
    }
}
