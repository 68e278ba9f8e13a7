//! Grid configuration
//!
//! Loaded from a TOML file (`clinic-roster.toml` by default). Every key is
//! optional; missing keys take the defaults below.
//!
//! ```toml
//! default_page_size = 25
//! page_size_options = [10, 25, 50]
//! default_sort_key = "name_flat"
//! preferences_dir = "/var/lib/clinic-roster/prefs"
//! user_id = "42"
//! ```

use roster_core::{RosterError, RosterResult, Validatable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "clinic-roster.toml";

/// Directory name used under the platform data directory
pub const APP_DIR_NAME: &str = "clinic-roster";

/// Grid and preference configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows per page when a screen opens
    pub default_page_size: usize,

    /// Page sizes offered by the page-size selector
    pub page_size_options: Vec<usize>,

    /// Flattened field sorted on when a screen opens
    pub default_sort_key: String,

    /// Where file-backed preferences are stored
    pub preferences_dir: Option<PathBuf>,

    /// Signed-in user; preferences fall back to local storage when absent
    pub user_id: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![5, 10, 25, 50, 100],
            default_sort_key: "name_flat".to_string(),
            preferences_dir: None,
            user_id: None,
        }
    }
}

impl GridConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Set the preferences directory
    pub fn with_preferences_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.preferences_dir = Some(dir.into());
        self
    }

    /// Set the signed-in user
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Whether a page size is one of the offered options
    pub fn allows_page_size(&self, page_size: usize) -> bool {
        self.page_size_options.contains(&page_size)
    }

    /// Parse from TOML text and validate
    pub fn from_toml_str(text: &str) -> RosterResult<Self> {
        let config: GridConfig =
            toml::from_str(text).map_err(|e| RosterError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> RosterResult<String> {
        toml::to_string_pretty(self).map_err(|e| RosterError::InvalidConfig(e.to_string()))
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> RosterResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RosterError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from a file if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> RosterResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from {}", path.display());
            Self::load(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// The preferences directory, defaulting to the platform data dir
    pub fn resolved_preferences_dir(&self) -> PathBuf {
        self.preferences_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
                .join("preferences")
        })
    }
}

impl Validatable for GridConfig {
    fn validate(&self) -> RosterResult<()> {
        if self.default_page_size == 0 {
            return Err(RosterError::InvalidConfig(
                "default_page_size must be at least 1".to_string(),
            ));
        }
        if self.page_size_options.is_empty() {
            return Err(RosterError::InvalidConfig(
                "page_size_options must not be empty".to_string(),
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(RosterError::InvalidConfig(
                "page_size_options entries must be at least 1".to_string(),
            ));
        }
        if self.default_sort_key.trim().is_empty() {
            return Err(RosterError::InvalidConfig(
                "default_sort_key must not be blank".to_string(),
            ));
        }
        Ok(())
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
    fn test_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.default_sort_key, "name_flat");
        assert!(config.is_valid());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GridConfig::from_toml_str("default_page_size = 25\nuser_id = \"42\"").unwrap();
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.user_id.as_deref(), Some("42"));
        assert_eq!(config.page_size_options, vec![5, 10, 25, 50, 100]);
    }

    #[test]
    fn test_allows_page_size() {
        let config = GridConfig::default();
        assert!(config.allows_page_size(25));
        assert!(!config.allows_page_size(7));

        let config = GridConfig::from_toml_str("page_size_options = [7]").unwrap();
        assert!(config.allows_page_size(7));
        assert!(!config.allows_page_size(10));
    }

    #[test]
    fn test_invalid_config() {
        assert!(GridConfig::from_toml_str("default_page_size = 0").is_err());
        assert!(GridConfig::from_toml_str("page_size_options = []").is_err());
        assert!(GridConfig::from_toml_str("page_size_options = [10, 0]").is_err());
        assert!(GridConfig::from_toml_str("default_page_size = \"ten\"").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = GridConfig::new()
            .with_page_size(50)
            .with_user_id("7")
            .with_preferences_dir("/tmp/prefs");
        let text = config.to_toml_string().unwrap();
        assert_eq!(GridConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_or_default() {
        let config = GridConfig::load_or_default("/nonexistent/clinic-roster.toml").unwrap();
        assert_eq!(config, GridConfig::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_sort_key = \"email_flat\"").unwrap();
        let config = GridConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.default_sort_key, "email_flat");
    }

    #[test]
    fn test_resolved_preferences_dir() {
        let config = GridConfig::new().with_preferences_dir("/tmp/prefs");
        assert_eq!(config.resolved_preferences_dir(), PathBuf::from("/tmp/prefs"));
        assert!(
            GridConfig::default()
                .resolved_preferences_dir()
                .ends_with("clinic-roster/preferences")
        );
    }
}
