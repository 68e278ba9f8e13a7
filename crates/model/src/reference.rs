//! Reference lookup tables: states, cities, roles
//!
//! Fetched once per screen and used to resolve display names for the ids
//! stored on records, and to drive the cascading state → city dropdown.
//! Ids arrive as numbers or strings and are normalized to strings.

use roster_core::{Identifiable, Named, RosterError, RosterResult, UserType};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Id deserialization
// ============================================================================

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or numeric id, found {other}"
        ))),
    }
}

fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a string or numeric id, found {other}"
        ))),
    }
}

// ============================================================================
// Reference Entities
// ============================================================================

/// A US state (or other first-level region)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

/// A city, optionally belonging to a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub state_id: Option<String>,
}

/// A role a person can hold, scoped to a user type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user_type: Option<String>,
}

impl State {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl City {
    pub fn new(id: impl Into<String>, name: impl Into<String>, state_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state_id: state_id.map(str::to_string),
        }
    }
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>, user_type: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            user_type: user_type.map(str::to_string),
        }
    }

    /// Whether this role applies to the given user type (case-insensitive)
    pub fn applies_to(&self, user_type: UserType) -> bool {
        self.user_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(user_type.query_name()))
    }
}

macro_rules! impl_reference_traits {
    ($($ty:ty),*) => {
        $(
            impl Identifiable for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }

            impl Named for $ty {
                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_reference_traits!(State, City, Role);

// ============================================================================
// ReferenceData
// ============================================================================

/// The lookup tables a screen resolves names against
///
/// Any list may be empty (not yet loaded); lookups then return `None` and
/// the flattener falls back to names embedded on the record.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    states: Vec<State>,
    cities: Vec<City>,
    roles: Vec<Role>,
    state_index: HashMap<String, usize>,
    city_index: HashMap<String, usize>,
    role_index: HashMap<String, usize>,
}

impl ReferenceData {
    /// Create reference data from the three lists
    pub fn new(states: Vec<State>, cities: Vec<City>, roles: Vec<Role>) -> Self {
        let state_index = index_by_id(&states);
        let city_index = index_by_id(&cities);
        let role_index = index_by_id(&roles);
        Self {
            states,
            cities,
            roles,
            state_index,
            city_index,
            role_index,
        }
    }

    /// Reference data with nothing loaded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the state list
    pub fn with_states(self, states: Vec<State>) -> Self {
        Self::new(states, self.cities, self.roles)
    }

    /// Replace the city list
    pub fn with_cities(self, cities: Vec<City>) -> Self {
        Self::new(self.states, cities, self.roles)
    }

    /// Replace the role list
    pub fn with_roles(self, roles: Vec<Role>) -> Self {
        Self::new(self.states, self.cities, roles)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Whether nothing has been loaded
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.cities.is_empty() && self.roles.is_empty()
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.state_index.get(id.trim()).map(|&i| &self.states[i])
    }

    pub fn city(&self, id: &str) -> Option<&City> {
        self.city_index.get(id.trim()).map(|&i| &self.cities[i])
    }

    pub fn role(&self, id: &str) -> Option<&Role> {
        self.role_index.get(id.trim()).map(|&i| &self.roles[i])
    }

    pub fn state_name(&self, id: &str) -> Option<&str> {
        self.state(id).map(|s| s.name())
    }

    pub fn city_name(&self, id: &str) -> Option<&str> {
        self.city(id).map(|c| c.name())
    }

    pub fn role_name(&self, id: &str) -> Option<&str> {
        self.role(id).map(|r| r.name())
    }

    /// Cities offered once a state is picked; a blank state offers all
    pub fn cities_in_state(&self, state_id: &str) -> Vec<&City> {
        let state_id = state_id.trim();
        if state_id.is_empty() {
            return self.cities.iter().collect();
        }
        self.cities
            .iter()
            .filter(|c| c.state_id.as_deref() == Some(state_id))
            .collect()
    }

    /// Role options for a screen: roles whose `user_type` matches
    pub fn roles_for(&self, user_type: UserType) -> Vec<&Role> {
        self.roles.iter().filter(|r| r.applies_to(user_type)).collect()
    }

    /// Find a state by display name (case-insensitive), used by CSV import
    pub fn find_state_by_name(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name_matches(name))
    }

    /// Find a city by display name (case-insensitive), used by CSV import
    pub fn find_city_by_name(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name_matches(name))
    }
}

fn index_by_id<T: Identifiable>(items: &[T]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        // first occurrence wins on duplicate ids
        index.entry(item.id().to_string()).or_insert(i);
    }
    index
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a reference list payload
///
/// Accepts a bare array or an object wrapping the array under `kind`
/// (`{ "states": [...] }`) or `data`.
pub fn parse_reference_list<T: DeserializeOwned>(kind: &str, json: &str) -> RosterResult<Vec<T>> {
    let value: Value = serde_json::from_str(json)?;
    let array = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove(kind)
            .or_else(|| map.remove("data"))
            .ok_or_else(|| {
                RosterError::invalid_reference(kind, format!("missing '{kind}' array"))
            })?,
        other => {
            return Err(RosterError::invalid_reference(
                kind,
                format!("expected an array or object, found {other}"),
            ));
        }
    };
    serde_json::from_value(array).map_err(|e| RosterError::invalid_reference(kind, e.to_string()))
}

pub fn parse_states(json: &str) -> RosterResult<Vec<State>> {
    parse_reference_list("states", json)
}

pub fn parse_cities(json: &str) -> RosterResult<Vec<City>> {
    parse_reference_list("cities", json)
}

pub fn parse_roles(json: &str) -> RosterResult<Vec<Role>> {
    parse_reference_list("roles", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReferenceData {
        ReferenceData::new(
            vec![State::new("1", "Texas"), State::new("2", "Ohio")],
            vec![
                City::new("10", "Austin", Some("1")),
                City::new("11", "Dallas", Some("1")),
                City::new("20", "Columbus", Some("2")),
            ],
            vec![
                Role::new("5", "Charge Nurse", Some("Nurse")),
                Role::new("6", "Super Admin", Some("admin")),
                Role::new("7", "Orphan", None),
            ],
        )
    }

    #[test]
    fn test_name_lookups() {
        let refs = sample();
        assert_eq!(refs.state_name("1"), Some("Texas"));
        assert_eq!(refs.city_name(" 20 "), Some("Columbus"));
        assert_eq!(refs.role_name("5"), Some("Charge Nurse"));
        assert_eq!(refs.state_name("99"), None);
    }

    #[test]
    fn test_empty_reference_data() {
        let refs = ReferenceData::empty();
        assert!(refs.is_empty());
        assert_eq!(refs.state_name("1"), None);
        assert!(refs.cities_in_state("1").is_empty());
    }

    #[test]
    fn test_cities_in_state() {
        let refs = sample();
        let names: Vec<_> = refs.cities_in_state("1").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Austin", "Dallas"]);
        assert_eq!(refs.cities_in_state("").len(), 3);
        assert!(refs.cities_in_state("3").is_empty());
    }

    #[test]
    fn test_roles_for_user_type() {
        let refs = sample();
        let nurse_roles: Vec<_> = refs.roles_for(UserType::Nurse).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(nurse_roles, vec!["5"]);
        let admin_roles: Vec<_> = refs.roles_for(UserType::Admin).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(admin_roles, vec!["6"]);
        assert!(refs.roles_for(UserType::Patient).is_empty());
    }

    #[test]
    fn test_parse_numeric_and_string_ids() {
        let states = parse_states(r#"[{"id": 1, "name": "Texas"}, {"id": "2", "name": "Ohio"}]"#).unwrap();
        assert_eq!(states[0].id, "1");
        assert_eq!(states[1].id, "2");

        let cities = parse_cities(r#"{"cities": [{"id": 10, "name": "Austin", "state_id": 1}, {"id": 11, "name": "Nowhere", "state_id": null}]}"#).unwrap();
        assert_eq!(cities[0].state_id.as_deref(), Some("1"));
        assert_eq!(cities[1].state_id, None);

        let roles = parse_roles(r#"{"data": [{"id": 5, "name": "Charge Nurse", "user_type": "Nurse"}]}"#).unwrap();
        assert_eq!(roles[0].user_type.as_deref(), Some("Nurse"));
    }

    #[test]
    fn test_parse_reference_errors() {
        let err = parse_states(r#"{"cities": []}"#).unwrap_err();
        assert!(err.is_format());

        let err = parse_states(r#"[{"id": true, "name": "Bad"}]"#).unwrap_err();
        assert!(err.is_format());

        let err = parse_states("42").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_with_builders_reindex() {
        let refs = ReferenceData::empty().with_states(vec![State::new("1", "Texas")]);
        assert_eq!(refs.state_name("1"), Some("Texas"));
        let refs = refs.with_roles(vec![Role::new("3", "Lead", Some("Technician"))]);
        assert_eq!(refs.state_name("1"), Some("Texas"));
        assert_eq!(refs.role_name("3"), Some("Lead"));
        assert_eq!(refs.find_state_by_name("texas").map(|s| s.id.as_str()), Some("1"));
    }
}
