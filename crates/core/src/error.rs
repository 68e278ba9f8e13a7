//! Error types for Clinic Roster
//!
//! This module provides unified error handling across the workspace,
//! including listing/reference parsing errors, preference storage errors,
//! CSV import errors, configuration errors, and IO/serialization errors.
//!
//! The grid pipeline itself never fails; these errors come from the
//! collaborators around it (loading snapshots, storing preferences).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Clinic Roster
#[derive(Debug, Error)]
pub enum RosterError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A CSV import row failed validation
    #[error("Import row {line} rejected: {message}")]
    ImportRow { line: usize, message: String },

    // ========================================================================
    // Input Format Errors
    // ========================================================================
    /// Listing payload was not `{ users: [...] }`, `{ patients: [...] }` or an array
    #[error("Invalid listing payload: {0}")]
    InvalidListing(String),

    /// Reference payload (states, cities, roles) could not be interpreted
    #[error("Invalid reference data for '{kind}': {message}")]
    InvalidReference { kind: String, message: String },

    /// CSV text could not be interpreted
    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    /// Unknown person screen / user type
    #[error("Unknown user type: {0}")]
    UnknownUserType(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Column id not part of the screen's column set
    #[error("Column '{column}' not found on screen '{screen}'")]
    ColumnNotFound { screen: String, column: String },

    /// Saved search not found
    #[error("Saved search not found: {0}")]
    SavedSearchNotFound(String),

    // ========================================================================
    // Preference Storage Errors
    // ========================================================================
    /// Preference store failed to read or write
    #[error("Preference store error: {0}")]
    Preferences(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// A fetch or mutation against the backend failed
    #[error("Request failed: {0}")]
    Request(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl RosterError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        RosterError::Validation(msg.into())
    }

    /// Create an import row error
    pub fn import_row(line: usize, msg: impl Into<String>) -> Self {
        RosterError::ImportRow {
            line,
            message: msg.into(),
        }
    }

    /// Create an invalid reference data error
    pub fn invalid_reference(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        RosterError::InvalidReference {
            kind: kind.into(),
            message: msg.into(),
        }
    }

    /// Create a preference store error
    pub fn preferences(msg: impl Into<String>) -> Self {
        RosterError::Preferences(msg.into())
    }

    /// Create a request error
    pub fn request(msg: impl Into<String>) -> Self {
        RosterError::Request(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        RosterError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        RosterError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RosterError::Validation(_) | RosterError::ImportRow { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RosterError::ColumnNotFound { .. } | RosterError::SavedSearchNotFound(_)
        )
    }

    /// Check if this error is an input format error
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            RosterError::InvalidListing(_)
                | RosterError::InvalidReference { .. }
                | RosterError::InvalidCsv(_)
                | RosterError::JsonSerialization(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            RosterError::Io(_)
                | RosterError::FileRead { .. }
                | RosterError::FileWrite { .. }
                | RosterError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using RosterError
pub type RosterResult<T> = Result<T, RosterError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> RosterResult<T>;
}

impl<T, E: Into<RosterError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> RosterResult<T> {
        self.map_err(|e| {
            let err: RosterError = e.into();
            RosterError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_error() {
        let err = RosterError::validation("Name is required");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Validation error: Name is required");
    }

    #[test]
    fn test_import_row_error() {
        let err = RosterError::import_row(4, "email is required");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Import row 4 rejected: email is required");
    }

    #[test]
    fn test_not_found_errors() {
        let err = RosterError::ColumnNotFound {
            screen: "nurses".to_string(),
            column: "salary".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Column 'salary' not found on screen 'nurses'"
        );
    }

    #[test]
    fn test_format_errors() {
        let err = RosterError::InvalidListing("expected an array".to_string());
        assert!(err.is_format());
        assert!(!err.is_io());

        let err = RosterError::invalid_reference("states", "not an array");
        assert!(err.is_format());
        assert_eq!(
            err.to_string(),
            "Invalid reference data for 'states': not an array"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = RosterError::with_context("Loading records", "Permission denied");
        assert_eq!(err.to_string(), "Loading records: Permission denied");
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.with_context("Reading states").unwrap_err();
        assert_eq!(err.to_string(), "Reading states: IO error: missing");
    }

    #[test]
    fn test_io_error_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RosterError = io_err.into();
        assert!(err.is_io());
    }
}
