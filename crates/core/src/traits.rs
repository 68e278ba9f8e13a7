//! Core traits for Clinic Roster
//!
//! This module defines the fundamental traits that types throughout
//! the workspace implement to provide consistent behavior for validation,
//! persistence, identity, and naming.

use crate::error::{RosterError, RosterResult};
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use roster_core::{Validatable, RosterResult, RosterError};
///
/// struct PageSize(usize);
///
/// impl Validatable for PageSize {
///     fn validate(&self) -> RosterResult<()> {
///         if self.0 == 0 {
///             return Err(RosterError::validation("Page size must be at least 1"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `RosterError` describing the problem.
    fn validate(&self) -> RosterResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for types that can be serialized to and deserialized from JSON files
///
/// Preference documents (visible columns, saved searches) implement this
/// so the file-backed store can read and write them uniformly.
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Get the file extension for this type (without the dot)
    fn file_extension() -> &'static str {
        "json"
    }

    /// Save to a JSON string
    fn to_json(&self) -> RosterResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> RosterResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file, creating parent directories as needed
    fn save_to_file(&self, path: &std::path::Path) -> RosterResult<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| RosterError::DirectoryCreate {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }
        std::fs::write(path, json).map_err(|e| RosterError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> RosterResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| RosterError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types that have a string identifier
///
/// Backend ids arrive as numbers or strings; implementors store the
/// normalized string form so comparisons never depend on the wire type.
pub trait Identifiable {
    /// Get the identifier
    fn id(&self) -> &str;

    /// Check if this matches another identifier (trimmed string equality)
    fn matches_id(&self, id: &str) -> bool {
        self.id() == id.trim()
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types that have a display name
pub trait Named {
    /// Get the name
    fn name(&self) -> &str;

    /// Check if the name matches (case-insensitive)
    fn name_matches(&self, other: &str) -> bool {
        self.name().eq_ignore_ascii_case(other.trim())
    }
}

// ============================================================================
// Timestamped Trait
// ============================================================================

/// Trait for types that track creation and modification times
pub trait Timestamped {
    /// Get the creation timestamp
    fn created_at(&self) -> chrono::DateTime<chrono::Utc>;

    /// Get the last modification timestamp
    fn modified_at(&self) -> chrono::DateTime<chrono::Utc>;

    /// Update the modification timestamp to now
    fn touch(&mut self);
}

// ============================================================================
// Tests
// ============================================================================
