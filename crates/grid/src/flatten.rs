//! Flatten stage
//!
//! Maps every record to exactly one [`FlatRow`]. Flattening is pure and
//! total: missing fields take per-field defaults and name resolution falls
//! back to legacy names embedded on the record, then to the empty string.

use roster_core::{CellValue, UserType};
use roster_model::{FlatRow, Record, ReferenceData, scalar_text, truthy};
use serde_json::Value;

// ============================================================================
// Flattened field names
// ============================================================================

pub const ID: &str = "id_flat";
pub const NAME: &str = "name_flat";
pub const EMAIL: &str = "email_flat";
pub const PHONE: &str = "phone_flat";
pub const ADDRESS: &str = "address_flat";
pub const ZIP: &str = "zip_flat";
pub const STATE_ID: &str = "state_id_flat";
pub const CITY_ID: &str = "city_id_flat";
pub const STATE_NAME: &str = "state_name_flat";
pub const CITY_NAME: &str = "city_name_flat";
pub const ROLE_ID: &str = "role_id_flat";
pub const ROLE_NAME: &str = "role_name_flat";
pub const IS_ACTIVE: &str = "is_active_flat";
pub const CREATED_AT: &str = "created_at_flat";
pub const UPDATED_AT: &str = "updated_at_flat";

/// Every key a person row carries
pub const PERSON_FIELDS: [&str; 15] = [
    ID, NAME, EMAIL, PHONE, ADDRESS, ZIP, STATE_ID, CITY_ID, STATE_NAME, CITY_NAME, ROLE_ID,
    ROLE_NAME, IS_ACTIVE, CREATED_AT, UPDATED_AT,
];

// ============================================================================
// Flattener
// ============================================================================

/// Turns one record into one flattened row
pub trait Flattener: std::fmt::Debug + Send + Sync {
    /// Flatten the record found at `index` of the fetched list
    fn flatten(&self, record: &Record, index: usize, reference: &ReferenceData) -> FlatRow;
}

/// Flatten a whole listing, preserving backend order
pub fn flatten_all(
    flattener: &dyn Flattener,
    records: &[Record],
    reference: &ReferenceData,
) -> Vec<FlatRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| flattener.flatten(record, index, reference))
        .collect()
}

/// The person mapping shared by every screen
///
/// Reads profile fields from `record.<profile>` (then its `user`, the
/// record's `user`, then top level) and resolves state, city and role
/// names through the reference data.
#[derive(Debug, Clone, Copy)]
pub struct ProfileFlattener {
    pub user_type: UserType,
}

impl ProfileFlattener {
    pub fn new(user_type: UserType) -> Self {
        Self { user_type }
    }

    fn name(&self, record: &Record) -> String {
        let name = record.text_field(self.user_type, "name");
        if !name.trim().is_empty() {
            return name;
        }
        // patients and older payloads split the name
        let first = record.text_field(self.user_type, "first_name");
        let last = record.text_field(self.user_type, "last_name");
        format!("{} {}", first.trim(), last.trim()).trim().to_string()
    }

    fn optional_text(&self, record: &Record, field: &str) -> CellValue {
        record
            .field(self.user_type, field)
            .and_then(scalar_text)
            .filter(|s| !s.trim().is_empty())
            .into()
    }

    /// Resolve a reference name: lookup by id, then the embedded
    /// `<kind>_name` or `<kind>.name` / `<kind>` string, then empty
    fn resolve_name<'a>(
        &self,
        record: &Record,
        id: &CellValue,
        kind: &str,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> String {
        if let Some(name) = id.as_str().and_then(&lookup) {
            return name.to_string();
        }
        if let Some(name) = record
            .field(self.user_type, &format!("{kind}_name"))
            .and_then(scalar_text)
        {
            return name;
        }
        match record.field(self.user_type, kind) {
            Some(Value::Object(map)) => map.get("name").and_then(scalar_text).unwrap_or_default(),
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

impl Flattener for ProfileFlattener {
    fn flatten(&self, record: &Record, index: usize, reference: &ReferenceData) -> FlatRow {
        let ut = self.user_type;
        let id = record.identity(ut);

        let state_id = CellValue::from_json_id(record.field(ut, "state_id"));
        let city_id = CellValue::from_json_id(record.field(ut, "city_id"));
        let role_id = CellValue::from_json_id(record.field(ut, "role_id"));

        let state_name = self.resolve_name(record, &state_id, "state", |id| reference.state_name(id));
        let city_name = self.resolve_name(record, &city_id, "city", |id| reference.city_name(id));
        let role_name = self.resolve_name(record, &role_id, "role", |id| reference.role_name(id));

        let mut row = FlatRow::new(id.clone(), index);
        row.insert(ID, id);
        row.insert(NAME, self.name(record));
        row.insert(EMAIL, record.text_field(ut, "email"));
        row.insert(PHONE, record.text_field(ut, "phone"));
        row.insert(ADDRESS, record.text_field(ut, "address"));
        row.insert(ZIP, record.text_field(ut, "zip"));
        row.insert(STATE_ID, state_id);
        row.insert(CITY_ID, city_id);
        row.insert(STATE_NAME, state_name);
        row.insert(CITY_NAME, city_name);
        row.insert(ROLE_ID, role_id);
        row.insert(ROLE_NAME, role_name);
        row.insert(IS_ACTIVE, truthy(record.field(ut, "is_active")));
        row.insert(CREATED_AT, self.optional_text(record, "created_at"));
        row.insert(UPDATED_AT, self.optional_text(record, "updated_at"));
        row
    }
}

// ============================================================================
// Tests
// ============================================================================
