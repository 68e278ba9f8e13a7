//! Per-user, per-screen preferences
//!
//! Two things are remembered for each `(user, screen)` pair: the visible
//! column set and a list of named saved searches. Both live in one
//! [`PreferenceDocument`] behind the [`PreferenceStore`] interface. When no
//! user is signed in the key falls back to a shared `local` slot.

use crate::filter::PersonFilters;
use crate::sort::SortSpec;
use chrono::{DateTime, Utc};
use roster_core::{
    Named, Persistable, ResultExt, RosterError, RosterResult, Timestamped, Validatable,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// Slot used when no user is signed in
pub const LOCAL_SLOT: &str = "local";

// ============================================================================
// PreferenceKey
// ============================================================================

/// Who and which screen a preference belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreferenceKey {
    pub user_id: Option<String>,
    pub screen: String,
}

impl PreferenceKey {
    pub fn new(user_id: Option<&str>, screen: impl Into<String>) -> Self {
        Self {
            user_id: user_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            screen: screen.into(),
        }
    }

    /// Key for the anonymous local slot
    pub fn local(screen: impl Into<String>) -> Self {
        Self::new(None, screen)
    }

    pub fn is_local(&self) -> bool {
        self.user_id.is_none()
    }

    /// File-system safe name, `<user|local>__<screen>`
    pub fn slug(&self) -> String {
        let user = self.user_id.as_deref().unwrap_or(LOCAL_SLOT);
        format!("{}__{}", sanitize(user), sanitize(&self.screen))
    }
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// SavedSearch
// ============================================================================

/// A named snapshot of a screen's filters, search text and sort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub filters: PersonFilters,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl SavedSearch {
    pub fn new(name: impl Into<String>, filters: PersonFilters) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            filters,
            search: String::new(),
            sort: None,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }
}

impl Named for SavedSearch {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Timestamped for SavedSearch {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

impl Validatable for SavedSearch {
    fn validate(&self) -> RosterResult<()> {
        if self.name.trim().is_empty() {
            return Err(RosterError::validation("Saved search name cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// PreferenceDocument
// ============================================================================

/// Everything stored for one key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceDocument {
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub saved_searches: Vec<SavedSearch>,
}

impl Persistable for PreferenceDocument {}

impl PreferenceDocument {
    /// Insert a saved search, replacing one with the same name
    pub fn upsert_search(&mut self, mut search: SavedSearch) {
        match self
            .saved_searches
            .iter_mut()
            .find(|s| s.name_matches(&search.name))
        {
            Some(existing) => {
                search.id = existing.id;
                search.created_at = existing.created_at;
                search.touch();
                *existing = search;
            }
            None => self.saved_searches.push(search),
        }
    }

    /// Remove a saved search by name
    pub fn remove_search(&mut self, name: &str) -> RosterResult<SavedSearch> {
        let index = self
            .saved_searches
            .iter()
            .position(|s| s.name_matches(name))
            .ok_or_else(|| RosterError::SavedSearchNotFound(name.to_string()))?;
        Ok(self.saved_searches.remove(index))
    }
}

// ============================================================================
// PreferenceStore
// ============================================================================

/// Key-value storage for preference documents
pub trait PreferenceStore: std::fmt::Debug + Send + Sync {
    /// Read the document for a key; a missing document is empty
    fn load_document(&self, key: &PreferenceKey) -> RosterResult<PreferenceDocument>;

    /// Write the document for a key
    fn store_document(&self, key: &PreferenceKey, document: &PreferenceDocument) -> RosterResult<()>;

    /// The visible-column set, if one was saved
    fn load_columns(&self, key: &PreferenceKey) -> RosterResult<Option<Vec<String>>> {
        Ok(self.load_document(key)?.columns)
    }

    fn save_columns(&self, key: &PreferenceKey, columns: &[String]) -> RosterResult<()> {
        let mut document = self.load_document(key)?;
        document.columns = Some(columns.to_vec());
        self.store_document(key, &document)
    }

    /// Forget the visible-column set (show every column)
    fn clear_columns(&self, key: &PreferenceKey) -> RosterResult<()> {
        let mut document = self.load_document(key)?;
        document.columns = None;
        self.store_document(key, &document)
    }

    fn load_saved_searches(&self, key: &PreferenceKey) -> RosterResult<Vec<SavedSearch>> {
        Ok(self.load_document(key)?.saved_searches)
    }

    /// Save a search; an existing search with the same name is replaced
    fn save_search(&self, key: &PreferenceKey, search: SavedSearch) -> RosterResult<()> {
        search.validate()?;
        let mut document = self.load_document(key)?;
        document.upsert_search(search);
        self.store_document(key, &document)
    }

    fn delete_search(&self, key: &PreferenceKey, name: &str) -> RosterResult<()> {
        let mut document = self.load_document(key)?;
        document.remove_search(name)?;
        self.store_document(key, &document)
    }
}

// ============================================================================
// MemoryPreferenceStore
// ============================================================================

/// Preferences held in memory for the life of the process
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    documents: Mutex<HashMap<PreferenceKey, PreferenceDocument>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_document(&self, key: &PreferenceKey) -> RosterResult<PreferenceDocument> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| RosterError::preferences("memory store lock poisoned"))?;
        Ok(documents.get(key).cloned().unwrap_or_default())
    }

    fn store_document(&self, key: &PreferenceKey, document: &PreferenceDocument) -> RosterResult<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| RosterError::preferences("memory store lock poisoned"))?;
        documents.insert(key.clone(), document.clone());
        Ok(())
    }
}

// ============================================================================
// FilePreferenceStore
// ============================================================================

/// One JSON document per key in a directory
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a key
    pub fn path_for(&self, key: &PreferenceKey) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            key.slug(),
            PreferenceDocument::file_extension()
        ))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_document(&self, key: &PreferenceKey) -> RosterResult<PreferenceDocument> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(PreferenceDocument::default());
        }
        PreferenceDocument::load_from_file(&path)
            .with_context(format!("reading preferences for {}", key.slug()))
    }

    fn store_document(&self, key: &PreferenceKey, document: &PreferenceDocument) -> RosterResult<()> {
        let path = self.path_for(key);
        document.save_to_file(&path)?;
        tracing::debug!("Stored preferences for {} at {}", key.slug(), path.display());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_store(store: &dyn PreferenceStore) {
        let key = PreferenceKey::new(Some("42"), "nurses");

        assert_eq!(store.load_columns(&key).unwrap(), None);
        store
            .save_columns(&key, &["name".to_string(), "email".to_string()])
            .unwrap();
        assert_eq!(
            store.load_columns(&key).unwrap(),
            Some(vec!["name".to_string(), "email".to_string()])
        );

        let search = SavedSearch::new("Active Texans", PersonFilters::new().with_state("1"))
            .with_search("ann");
        store.save_search(&key, search).unwrap();
        let first_id = store.load_saved_searches(&key).unwrap()[0].id;

        let replacement = SavedSearch::new("active texans", PersonFilters::new().with_status("active"));
        store.save_search(&key, replacement).unwrap();
        let searches = store.load_saved_searches(&key).unwrap();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].id, first_id);
        assert_eq!(searches[0].filters.status, "active");

        // other users and the local slot are separate
        assert!(store.load_saved_searches(&PreferenceKey::local("nurses")).unwrap().is_empty());

        store.delete_search(&key, "ACTIVE TEXANS").unwrap();
        assert!(store.load_saved_searches(&key).unwrap().is_empty());
        assert!(store.delete_search(&key, "missing").unwrap_err().is_not_found());

        store.clear_columns(&key).unwrap();
        assert_eq!(store.load_columns(&key).unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        exercise_store(&MemoryPreferenceStore::new());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs"));
        exercise_store(&store);
        assert!(store.path_for(&PreferenceKey::new(Some("42"), "nurses")).exists());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let key = PreferenceKey::local("patients");
        FilePreferenceStore::new(dir.path())
            .save_columns(&key, &["zip".to_string()])
            .unwrap();
        let reopened = FilePreferenceStore::new(dir.path());
        assert_eq!(
            reopened.load_columns(&key).unwrap(),
            Some(vec!["zip".to_string()])
        );
    }

    #[test]
    fn test_corrupt_file_reports_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path());
        let key = PreferenceKey::local("users");
        std::fs::write(store.path_for(&key), "{ not json").unwrap();
        let err = store.load_columns(&key).unwrap_err();
        assert!(err.to_string().contains("local__users"));
    }

    #[test]
    fn test_blank_saved_search_name_rejected() {
        let store = MemoryPreferenceStore::new();
        let err = store
            .save_search(&PreferenceKey::local("users"), SavedSearch::new("  ", PersonFilters::new()))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_key_slug() {
        assert_eq!(PreferenceKey::new(Some("a/b"), "users").slug(), "a_b__users");
        assert_eq!(PreferenceKey::new(Some("  "), "users").slug(), "local__users");
        assert!(PreferenceKey::local("users").is_local());
    }
}
