//! Core types used throughout Clinic Roster
//!
//! This module contains the small value types shared by the model, grid,
//! and CLI crates: which person screen a record belongs to, the value of
//! a flattened cell, and the direction of the active sort.

use crate::error::RosterError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// User Types
// ============================================================================

/// The kind of person a screen manages
///
/// Each kind maps to the nested profile object carried by its records
/// (`record.admin`, `record.nurse`, ...) and to the `userType` query
/// parameter of the listing and roles endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Back-office users (administrators)
    #[default]
    Admin,
    Nurse,
    Patient,
    Provider,
    Technician,
}

impl UserType {
    /// Get all user types in screen order
    pub fn all() -> &'static [UserType] {
        &[
            UserType::Admin,
            UserType::Nurse,
            UserType::Patient,
            UserType::Provider,
            UserType::Technician,
        ]
    }

    /// Key of the nested profile object on a record
    pub fn profile_key(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Nurse => "nurse",
            UserType::Patient => "patient",
            UserType::Provider => "provider",
            UserType::Technician => "technician",
        }
    }

    /// Key of the array inside a listing envelope
    pub fn listing_key(&self) -> &'static str {
        match self {
            UserType::Patient => "patients",
            _ => "users",
        }
    }

    /// Value sent as `userType` to the listing and roles endpoints
    pub fn query_name(&self) -> &'static str {
        match self {
            UserType::Admin => "Admin",
            UserType::Nurse => "Nurse",
            UserType::Patient => "Patient",
            UserType::Provider => "Provider",
            UserType::Technician => "Technician",
        }
    }

    /// Title of the screen managing this user type
    pub fn screen_title(&self) -> &'static str {
        match self {
            UserType::Admin => "Users",
            UserType::Nurse => "Nurses",
            UserType::Patient => "Patients",
            UserType::Provider => "Providers",
            UserType::Technician => "Technicians",
        }
    }

    /// Stable screen name used for preference keys and export file names
    pub fn screen_name(&self) -> &'static str {
        match self {
            UserType::Admin => "users",
            UserType::Nurse => "nurses",
            UserType::Patient => "patients",
            UserType::Provider => "providers",
            UserType::Technician => "technicians",
        }
    }

    /// Whether records of this type carry a role
    pub fn has_roles(&self) -> bool {
        !matches!(self, UserType::Patient)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query_name())
    }
}

impl FromStr for UserType {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "admins" | "user" | "users" => Ok(UserType::Admin),
            "nurse" | "nurses" => Ok(UserType::Nurse),
            "patient" | "patients" => Ok(UserType::Patient),
            "provider" | "providers" => Ok(UserType::Provider),
            "technician" | "technicians" => Ok(UserType::Technician),
            _ => Err(RosterError::UnknownUserType(s.to_string())),
        }
    }
}

// ============================================================================
// Sort Direction
// ============================================================================

/// Direction of the single active sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    /// The opposite direction
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header indicator glyph
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    /// Short label (`asc` / `desc`)
    pub fn short_name(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

// ============================================================================
// Cell Values
// ============================================================================

/// The value of one field of a flattened row
///
/// Flattening coerces ids to text, so only three shapes exist. Every
/// comparison the grid performs goes through [`CellValue::as_text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Coerce to a string: null is empty, booleans are `true`/`false`
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(v) => v.to_string(),
            CellValue::Text(v) => v.clone(),
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Check if null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Build a cell from an optional JSON scalar, coercing numbers to text
    pub fn from_json_id(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                CellValue::Text(s.trim().to_string())
            }
            Some(serde_json::Value::Number(n)) => CellValue::Text(n.to_string()),
            _ => CellValue::Null,
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

// ============================================================================
// Tests
// ============================================================================
