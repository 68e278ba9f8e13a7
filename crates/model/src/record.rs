//! Person records as returned by the listing endpoints
//!
//! A record is an opaque JSON object. Profile fields live on a nested
//! object named after the user type (`record.nurse.name`), sometimes on a
//! nested `user` object, and on older payloads directly on the record.
//! This module only knows how to look things up; it never mutates a record.

use roster_core::UserType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Record
// ============================================================================

/// One person record, exactly as fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wrap a JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The underlying JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the record, returning the JSON value
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a dotted path (`"nurse.user.email"`)
    ///
    /// Returns `None` when any segment is missing or the value is null.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = &self.0;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = current.as_object()?.get(segment)?;
        }
        if current.is_null() { None } else { Some(current) }
    }

    /// The nested profile object for a user type, if present
    pub fn profile(&self, user_type: UserType) -> Option<&Value> {
        self.get_path(user_type.profile_key())
            .filter(|v| v.is_object())
    }

    /// Find a profile field, searching the profile, its `user`, the
    /// record's `user`, then the record itself
    pub fn field(&self, user_type: UserType, name: &str) -> Option<&Value> {
        let profile = user_type.profile_key();
        [
            format!("{profile}.{name}"),
            format!("{profile}.user.{name}"),
            format!("user.{name}"),
            name.to_string(),
        ]
        .iter()
        .find_map(|path| self.get_path(path))
    }

    /// A profile field coerced to text, or empty
    pub fn text_field(&self, user_type: UserType, name: &str) -> String {
        self.field(user_type, name)
            .and_then(scalar_text)
            .unwrap_or_default()
    }

    /// The record's identity key
    ///
    /// Tries `id`, `user.id`, `<profile>.user_id`, `<profile>.user.id`,
    /// then `<profile>.id`.
    pub fn identity(&self, user_type: UserType) -> Option<String> {
        let profile = user_type.profile_key();
        [
            "id".to_string(),
            "user.id".to_string(),
            format!("{profile}.user_id"),
            format!("{profile}.user.id"),
            format!("{profile}.id"),
        ]
        .iter()
        .filter_map(|path| self.get_path(path))
        .find_map(|value| scalar_text(value).filter(|id| !id.trim().is_empty()))
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Coerce a JSON scalar to text
///
/// Strings are returned as-is, numbers and booleans in their JSON form.
/// Arrays, objects and null have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Interpret a JSON value as an active flag
///
/// Accepts booleans, `1`/`0`, and the strings `true`, `1`, `active`, `yes`.
/// Everything else, including absence, is inactive.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "active" | "yes"
        ),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
