//! Sort stage
//!
//! One active sort key at a time. Values are compared as lower-cased
//! strings (null reads as empty). The sort is stable, and descending
//! reverses the comparator so ties keep backend order either way.

use roster_core::SortDirection;
use roster_model::FlatRow;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Reverse;

/// The active sort
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Flattened field name
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Ascending)
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Descending)
    }

    /// The sort after clicking `key`
    ///
    /// Same key flips the direction; a new key starts ascending.
    pub fn toggle(current: Option<&SortSpec>, key: &str) -> SortSpec {
        match current {
            Some(spec) if spec.key == key => SortSpec::new(key, spec.direction.flipped()),
            _ => SortSpec::ascending(key),
        }
    }

    /// Header indicator for a column sorted on `key`
    pub fn indicator_for(&self, key: &str) -> Option<SortDirection> {
        (self.key == key).then_some(self.direction)
    }
}

/// The comparison key of a row for a field
pub fn sort_key(row: &FlatRow, key: &str) -> String {
    row.text(key).to_lowercase()
}

/// Stable sort in place
pub fn sort_rows<R: Borrow<FlatRow>>(rows: &mut [R], spec: &SortSpec) {
    match spec.direction {
        SortDirection::Ascending => {
            rows.sort_by_cached_key(|row| sort_key(Borrow::<FlatRow>::borrow(row), &spec.key));
        }
        SortDirection::Descending => {
            rows.sort_by_cached_key(|row| Reverse(sort_key(Borrow::<FlatRow>::borrow(row), &spec.key)));
        }
    }
}
