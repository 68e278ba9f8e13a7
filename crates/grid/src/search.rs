//! Free-text search stage
//!
//! A row survives when any of the searched fields contains the query
//! (case-insensitive, trimmed). A blank query keeps every row.

use crate::flatten;
use roster_model::FlatRow;

/// Fields searched when a screen does not override them
pub const DEFAULT_SEARCH_FIELDS: [&str; 8] = [
    flatten::NAME,
    flatten::EMAIL,
    flatten::PHONE,
    flatten::ADDRESS,
    flatten::ZIP,
    flatten::STATE_NAME,
    flatten::CITY_NAME,
    flatten::ROLE_NAME,
];

/// Whether the row matches the query in any field
pub fn matches_search(row: &FlatRow, query: &str, fields: &[String]) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| row.text(field).to_lowercase().contains(&query))
}

/// Keep the rows matching the query, in order
pub fn apply_search<'a, I>(rows: I, query: &str, fields: &[String]) -> Vec<&'a FlatRow>
where
    I: IntoIterator<Item = &'a FlatRow>,
{
    rows.into_iter()
        .filter(|row| matches_search(row, query, fields))
        .collect()
}

/// The default search fields as owned strings
pub fn default_search_fields() -> Vec<String> {
    DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect()
}
