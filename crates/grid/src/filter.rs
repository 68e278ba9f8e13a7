//! Filter stage
//!
//! A [`FilterSet`] is a conjunction of field predicates. A predicate whose
//! value is blank (empty or all whitespace) imposes no constraint, so an
//! all-blank set is the identity.

use crate::flatten;
use roster_model::{FlatRow, ReferenceData};
use serde::{Deserialize, Serialize};

// ============================================================================
// FilterOp / FieldFilter
// ============================================================================

/// How a filter value is compared against a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Case-insensitive substring
    Contains,
    /// String equality (ids compared as text)
    Equals,
    /// `active` / `inactive` against a boolean field
    Status,
}

/// Parsed status filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Inactive,
}

impl StatusFilter {
    /// Parse a status value; `None` for unrecognized values
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" | "true" | "1" => Some(StatusFilter::Active),
            "inactive" | "false" | "0" => Some(StatusFilter::Inactive),
            _ => None,
        }
    }

    fn wants_active(&self) -> bool {
        matches!(self, StatusFilter::Active)
    }
}

/// One predicate on one flattened field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Contains, value)
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Equals, value)
    }

    pub fn status(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Status, value)
    }

    /// Whether this predicate is absent
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Whether the row satisfies this predicate
    pub fn matches(&self, row: &FlatRow) -> bool {
        if self.is_blank() {
            return true;
        }
        let query = self.value.trim();
        match self.op {
            FilterOp::Contains => row
                .text(&self.field)
                .to_lowercase()
                .contains(&query.to_lowercase()),
            FilterOp::Equals => row.text(&self.field).trim() == query,
            FilterOp::Status => match StatusFilter::parse(query) {
                Some(status) => {
                    row.get(&self.field).as_bool().unwrap_or(false) == status.wants_active()
                }
                None => true,
            },
        }
    }
}

// ============================================================================
// FilterSet
// ============================================================================

/// A conjunction of field predicates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSet {
    filters: Vec<FieldFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate using builder pattern
    pub fn with(mut self, filter: FieldFilter) -> Self {
        self.push(filter);
        self
    }

    pub fn push(&mut self, filter: FieldFilter) {
        if filter.op == FilterOp::Status
            && !filter.is_blank()
            && StatusFilter::parse(&filter.value).is_none()
        {
            tracing::warn!(
                "Ignoring unrecognized status filter '{}' on {}",
                filter.value,
                filter.field
            );
        }
        self.filters.push(filter);
    }

    /// Conjunction of two sets
    pub fn and(mut self, other: FilterSet) -> Self {
        self.filters.extend(other.filters);
        self
    }

    /// All predicates, including blank ones
    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    /// Predicates that constrain rows
    pub fn active(&self) -> impl Iterator<Item = &FieldFilter> {
        self.filters.iter().filter(|f| !f.is_blank())
    }

    /// Whether no predicate constrains rows
    pub fn is_blank(&self) -> bool {
        self.active().next().is_none()
    }

    /// Whether the row satisfies every predicate
    pub fn matches(&self, row: &FlatRow) -> bool {
        self.active().all(|f| f.matches(row))
    }

    /// Keep the rows satisfying every predicate, in order
    pub fn apply<'a, I>(&self, rows: I) -> Vec<&'a FlatRow>
    where
        I: IntoIterator<Item = &'a FlatRow>,
    {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

// ============================================================================
// PersonFilters
// ============================================================================

/// The structured filter panel shown on every person screen
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonFilters {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role_id: String,
    pub state_id: String,
    pub city_id: String,
    /// `""`, `active` or `inactive`
    pub status: String,
}

impl PersonFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.role_id = role_id.into();
        self
    }

    pub fn with_state(mut self, state_id: impl Into<String>) -> Self {
        self.state_id = state_id.into();
        self
    }

    pub fn with_city(mut self, city_id: impl Into<String>) -> Self {
        self.city_id = city_id.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Pick a state in the cascading dropdown
    ///
    /// Clears the city when it does not belong to the new state.
    pub fn select_state(&mut self, state_id: impl Into<String>, reference: &ReferenceData) {
        self.state_id = state_id.into();
        if self.city_id.trim().is_empty() {
            return;
        }
        let city_in_state = reference
            .cities_in_state(&self.state_id)
            .iter()
            .any(|c| c.id == self.city_id.trim());
        if !city_in_state {
            self.city_id.clear();
        }
    }

    /// Reset every field
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        self.to_filter_set().is_blank()
    }

    /// Convert to predicates on flattened fields
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .with(FieldFilter::contains(flatten::NAME, &self.name))
            .with(FieldFilter::contains(flatten::EMAIL, &self.email))
            .with(FieldFilter::contains(flatten::PHONE, &self.phone))
            .with(FieldFilter::equals(flatten::ROLE_ID, &self.role_id))
            .with(FieldFilter::equals(flatten::STATE_ID, &self.state_id))
            .with(FieldFilter::equals(flatten::CITY_ID, &self.city_id))
            .with(FieldFilter::status(flatten::IS_ACTIVE, &self.status))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use roster_model::{City, State};

    fn row(name: &str, email: &str, state_id: Option<&str>, active: bool) -> FlatRow {
        FlatRow::new(None, 0)
            .with(flatten::NAME, name)
            .with(flatten::EMAIL, email)
            .with(flatten::STATE_ID, state_id)
            .with(flatten::IS_ACTIVE, active)
    }

    fn rows() -> Vec<FlatRow> {
        vec![
            row("Bob Stone", "bob@a.test", Some("1"), true),
            row("Ann Lee", "ann@b.test", Some("2"), false),
            row("Cid Moe", "cid@a.test", None, true),
        ]
    }

    fn names(rows: &[&FlatRow]) -> Vec<String> {
        rows.iter().map(|r| r.text(flatten::NAME)).collect()
    }

    #[test]
    fn test_blank_filter_set_is_identity() {
        let rows = rows();
        let filtered = PersonFilters::new()
            .with_name("   ")
            .with_status("")
            .to_filter_set()
            .apply(&rows);
        assert_eq!(filtered.len(), rows.len());
        assert!(filtered.iter().zip(rows.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
        assert!(PersonFilters::new().with_phone("\t").is_blank());
    }

    #[test]
    fn test_contains_is_case_insensitive_and_trimmed() {
        let rows = rows();
        let set = FilterSet::new().with(FieldFilter::contains(flatten::NAME, "  LEE "));
        assert_eq!(names(&set.apply(&rows)), vec!["Ann Lee"]);
    }

    #[test]
    fn test_equals_tolerates_numeric_ids() {
        let rows = rows();
        let set = PersonFilters::new().with_state(" 1").to_filter_set();
        assert_eq!(names(&set.apply(&rows)), vec!["Bob Stone"]);
    }

    #[test]
    fn test_status_filter() {
        let rows = rows();
        let active = PersonFilters::new().with_status("active").to_filter_set();
        assert_eq!(names(&active.apply(&rows)), vec!["Bob Stone", "Cid Moe"]);

        let inactive = PersonFilters::new().with_status("Inactive").to_filter_set();
        assert_eq!(names(&inactive.apply(&rows)), vec!["Ann Lee"]);

        let unknown = PersonFilters::new().with_status("archived").to_filter_set();
        assert_eq!(unknown.apply(&rows).len(), 3);
    }

    #[test]
    fn test_filter_conjunction() {
        let rows = rows();
        let a = FilterSet::new().with(FieldFilter::contains(flatten::EMAIL, "@a.test"));
        let b = FilterSet::new().with(FieldFilter::status(flatten::IS_ACTIVE, "active"));

        let both = a.clone().and(b.clone()).apply(&rows);
        let sequential = b.apply(a.apply(&rows));
        assert_eq!(names(&both), names(&sequential));
        assert_eq!(names(&both), vec!["Bob Stone", "Cid Moe"]);
    }

    #[test]
    fn test_select_state_cascades_city() {
        let reference = ReferenceData::new(
            vec![State::new("1", "Texas"), State::new("2", "Ohio")],
            vec![City::new("10", "Austin", Some("1")), City::new("20", "Columbus", Some("2"))],
            vec![],
        );
        let mut filters = PersonFilters::new().with_state("1").with_city("10");
        filters.select_state("1", &reference);
        assert_eq!(filters.city_id, "10");

        filters.select_state("2", &reference);
        assert_eq!(filters.state_id, "2");
        assert_eq!(filters.city_id, "");

        filters.clear();
        assert!(filters.is_blank());
    }
}
