//! Person screens
//!
//! The five back-office screens (Users, Nurses, Patients, Providers,
//! Technicians) differ only in their [`UserType`]. A [`ScreenDefinition`]
//! describes the table for one type and a [`Screen`] drives it: the grid
//! pipeline, the filter panel, which modal is open, and outcome toasts.

use crate::filter::PersonFilters;
use crate::flatten::{self, ProfileFlattener};
use crate::notify::Notifier;
use crate::pipeline::{GridState, GridView};
use crate::preferences::{PreferenceKey, SavedSearch};
use crate::project::ColumnSet;
use crate::search::DEFAULT_SEARCH_FIELDS;
use crate::sort::SortSpec;
use roster_core::{RosterResult, UserType};
use roster_model::{CellRenderer, ColumnDescriptor, GridConfig, Record, ReferenceData, Role};
use std::sync::Arc;

// ============================================================================
// ScreenDefinition
// ============================================================================

/// Static description of one person screen
#[derive(Debug, Clone)]
pub struct ScreenDefinition {
    pub user_type: UserType,
    /// Machine name, used for preference keys and export file names
    pub name: String,
    pub title: String,
    pub columns: ColumnSet,
    pub search_fields: Vec<String>,
    pub default_sort: SortSpec,
}

impl ScreenDefinition {
    /// The screen for a user type
    pub fn for_user_type(user_type: UserType) -> Self {
        Self {
            user_type,
            name: user_type.screen_name().to_string(),
            title: user_type.screen_title().to_string(),
            columns: person_columns(user_type),
            search_fields: search_fields(user_type),
            default_sort: SortSpec::ascending(flatten::NAME),
        }
    }

    /// Every screen, in menu order
    pub fn all() -> Vec<Self> {
        UserType::all()
            .iter()
            .copied()
            .map(Self::for_user_type)
            .collect()
    }

    /// Singular noun used in toasts ("Nurse created")
    pub fn singular(&self) -> &'static str {
        match self.user_type {
            UserType::Admin => "User",
            UserType::Nurse => "Nurse",
            UserType::Patient => "Patient",
            UserType::Provider => "Provider",
            UserType::Technician => "Technician",
        }
    }
}

/// The person column set; Patients have no role column
fn person_columns(user_type: UserType) -> ColumnSet {
    let mut columns = vec![
        ColumnDescriptor::new("name", flatten::NAME).sortable(),
        ColumnDescriptor::new("email", flatten::EMAIL).sortable(),
        ColumnDescriptor::new("phone", flatten::PHONE).sortable(),
        ColumnDescriptor::new("address", flatten::ADDRESS),
        ColumnDescriptor::new("zip", flatten::ZIP).with_title("Zip Code"),
        ColumnDescriptor::new("state", flatten::STATE_NAME).sortable(),
        ColumnDescriptor::new("city", flatten::CITY_NAME).sortable(),
    ];
    if user_type.has_roles() {
        columns.push(ColumnDescriptor::new("role", flatten::ROLE_NAME).sortable());
    }
    columns.extend([
        ColumnDescriptor::new("status", flatten::IS_ACTIVE)
            .with_renderer(CellRenderer::Status)
            .sortable(),
        ColumnDescriptor::new("created_at", flatten::CREATED_AT)
            .with_title("Created")
            .with_renderer(CellRenderer::DateTime)
            .sortable(),
        ColumnDescriptor::new("updated_at", flatten::UPDATED_AT)
            .with_title("Updated")
            .with_renderer(CellRenderer::DateTime)
            .sortable(),
    ]);
    ColumnSet::new(columns)
}

fn search_fields(user_type: UserType) -> Vec<String> {
    DEFAULT_SEARCH_FIELDS
        .iter()
        .filter(|field| user_type.has_roles() || **field != flatten::ROLE_NAME)
        .map(|field| field.to_string())
        .collect()
}

// ============================================================================
// Modals and mutations
// ============================================================================

/// Which dialog is open; at most one at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalId {
    Create,
    Edit(String),
    ConfirmDelete(String),
    ResetPassword(String),
    Import,
    Columns,
    SavedSearches,
}

impl ModalId {
    /// Record the dialog acts on, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            ModalId::Edit(id) | ModalId::ConfirmDelete(id) | ModalId::ResetPassword(id) => {
                Some(id)
            }
            _ => None,
        }
    }
}

/// A write sent to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Edit,
    ToggleActive,
    SoftDelete,
    ResetPassword,
    Import,
}

impl MutationKind {
    fn success_message(&self, noun: &str) -> String {
        match self {
            MutationKind::Create => format!("{noun} created successfully"),
            MutationKind::Edit => format!("{noun} updated successfully"),
            MutationKind::ToggleActive => format!("{noun} status updated"),
            MutationKind::SoftDelete => format!("{noun} deleted successfully"),
            MutationKind::ResetPassword => "Password reset successfully".to_string(),
            MutationKind::Import => format!("{noun} import completed"),
        }
    }

    fn failure_message(&self, noun: &str) -> String {
        match self {
            MutationKind::Create => format!("Failed to create {}", noun.to_lowercase()),
            MutationKind::Edit => format!("Failed to update {}", noun.to_lowercase()),
            MutationKind::ToggleActive => format!("Failed to update {} status", noun.to_lowercase()),
            MutationKind::SoftDelete => format!("Failed to delete {}", noun.to_lowercase()),
            MutationKind::ResetPassword => "Failed to reset password".to_string(),
            MutationKind::Import => format!("Failed to import {}s", noun.to_lowercase()),
        }
    }
}

// ============================================================================
// Screen
// ============================================================================

/// One live person screen
#[derive(Debug)]
pub struct Screen {
    definition: ScreenDefinition,
    grid: GridState,
    filters: PersonFilters,
    active_modal: Option<ModalId>,
    notifier: Arc<dyn Notifier>,
    needs_refetch: bool,
}

impl Screen {
    /// Create a screen with no records loaded
    pub fn new(user_type: UserType, config: &GridConfig, notifier: Arc<dyn Notifier>) -> Self {
        let mut definition = ScreenDefinition::for_user_type(user_type);
        definition.default_sort = SortSpec::ascending(config.default_sort_key.clone());
        let grid = GridState::new(ProfileFlattener::new(user_type), definition.columns.clone())
            .with_search_fields(definition.search_fields.clone())
            .with_sort(definition.default_sort.clone())
            .with_page_size(config.default_page_size);
        Self {
            definition,
            grid,
            filters: PersonFilters::new(),
            active_modal: None,
            notifier,
            needs_refetch: true,
        }
    }

    pub fn definition(&self) -> &ScreenDefinition {
        &self.definition
    }

    pub fn user_type(&self) -> UserType {
        self.definition.user_type
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Direct access for sort, paging and column changes
    pub fn grid_mut(&mut self) -> &mut GridState {
        &mut self.grid
    }

    pub fn filters(&self) -> &PersonFilters {
        &self.filters
    }

    /// Whether the records are stale and should be fetched again
    pub fn needs_refetch(&self) -> bool {
        self.needs_refetch
    }

    /// Preference key for this screen and user
    pub fn preference_key(&self, user_id: Option<&str>) -> PreferenceKey {
        PreferenceKey::new(user_id, self.definition.name.clone())
    }

    // ========================================================================
    // Data loading
    // ========================================================================

    /// Take the result of a record fetch
    ///
    /// On failure the previous records stay in place.
    pub fn apply_fetch(&mut self, result: RosterResult<Vec<Record>>) {
        match result {
            Ok(records) => {
                tracing::info!(
                    "Loaded {} {} records",
                    records.len(),
                    self.definition.name
                );
                self.grid.set_records(records);
                self.needs_refetch = false;
            }
            Err(err) => {
                tracing::warn!("Fetching {} failed: {}", self.definition.name, err);
                self.notifier.error(&format!(
                    "Failed to load {}: {}",
                    self.definition.title.to_lowercase(),
                    err
                ));
            }
        }
    }

    /// Take the result of a reference-data fetch
    pub fn apply_reference(&mut self, result: RosterResult<ReferenceData>) {
        match result {
            Ok(reference) => self.grid.set_reference_data(reference),
            Err(err) => {
                tracing::warn!("Fetching reference data failed: {}", err);
                self.notifier
                    .error(&format!("Failed to load reference data: {err}"));
            }
        }
    }

    /// Roles offered in the role dropdown for this screen
    pub fn role_options(&self) -> Vec<&Role> {
        if !self.definition.user_type.has_roles() {
            return Vec::new();
        }
        self.grid.reference().roles_for(self.definition.user_type)
    }

    // ========================================================================
    // Filter panel
    // ========================================================================

    /// Replace the filter panel; returns to page 1
    pub fn set_filters(&mut self, filters: PersonFilters) {
        self.filters = filters;
        self.grid.set_filters(self.filters.to_filter_set());
    }

    /// Pick a state, clearing a city outside it
    pub fn select_state(&mut self, state_id: &str) {
        self.filters.select_state(state_id, self.grid.reference());
        self.grid.set_filters(self.filters.to_filter_set());
    }

    /// Reset the filter panel and search text
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.grid.set_filters(self.filters.to_filter_set());
        self.grid.set_search("");
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.grid.set_search(search);
    }

    /// Restore a saved search's filters, search text and sort
    pub fn apply_saved_search(&mut self, saved: &SavedSearch) {
        self.set_filters(saved.filters.clone());
        self.grid.set_search(saved.search.clone());
        self.grid.set_sort(
            saved
                .sort
                .clone()
                .or_else(|| Some(self.definition.default_sort.clone())),
        );
        tracing::debug!("Applied saved search '{}'", saved.name);
    }

    /// Capture the current filters, search text and sort under a name
    pub fn snapshot_search(&self, name: &str) -> SavedSearch {
        SavedSearch::new(name, self.filters.clone())
            .with_search(self.grid.search())
            .with_sort(self.grid.sort().cloned())
    }

    // ========================================================================
    // Modals and mutations
    // ========================================================================

    pub fn active_modal(&self) -> Option<&ModalId> {
        self.active_modal.as_ref()
    }

    /// Open a dialog, replacing any open one
    pub fn open_modal(&mut self, modal: ModalId) {
        tracing::debug!("Opening {:?} on {}", modal, self.definition.name);
        self.active_modal = Some(modal);
    }

    pub fn close_modal(&mut self) {
        self.active_modal = None;
    }

    /// Report the outcome of a write
    ///
    /// Success closes the dialog and marks the records stale. Failure keeps
    /// the dialog open so the input is not lost.
    pub fn complete_mutation(&mut self, kind: MutationKind, result: RosterResult<()>) {
        let noun = self.definition.singular();
        match result {
            Ok(()) => {
                self.active_modal = None;
                self.needs_refetch = true;
                self.notifier.success(&kind.success_message(noun));
            }
            Err(err) => {
                tracing::warn!("{:?} on {} failed: {}", kind, self.definition.name, err);
                self.notifier
                    .error(&format!("{}: {}", kind.failure_message(noun), err));
            }
        }
    }

    /// Compute the visible page
    pub fn view(&mut self) -> GridView {
        self.grid.view()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemoryNotifier, ToastLevel};
    use roster_core::RosterError;
    use roster_model::{City, State};
    use serde_json::json;

    fn screen(user_type: UserType) -> (Screen, Arc<MemoryNotifier>) {
        let notifier = Arc::new(MemoryNotifier::new());
        let screen = Screen::new(user_type, &GridConfig::default(), notifier.clone());
        (screen, notifier)
    }

    fn nurses() -> Vec<Record> {
        vec![
            Record::new(json!({
                "id": 1,
                "nurse": { "name": "Bob", "email": "bob@a.test", "state_id": 1, "city_id": 10, "is_active": true }
            })),
            Record::new(json!({
                "id": 2,
                "nurse": { "name": "Ann", "email": "ann@b.test", "state_id": 2, "city_id": 20, "is_active": false }
            })),
        ]
    }

    fn reference() -> ReferenceData {
        ReferenceData::new(
            vec![State::new("1", "Texas"), State::new("2", "Ohio")],
            vec![City::new("10", "Austin", Some("1")), City::new("20", "Columbus", Some("2"))],
            vec![
                Role::new("7", "Charge Nurse", Some("nurse")),
                Role::new("8", "Surgeon", Some("provider")),
            ],
        )
    }

    #[test]
    fn test_definitions() {
        let all = ScreenDefinition::all();
        assert_eq!(all.len(), 5);

        let patients = ScreenDefinition::for_user_type(UserType::Patient);
        assert!(patients.columns.get("role").is_none());
        assert!(!patients.search_fields.iter().any(|f| f == flatten::ROLE_NAME));

        let users = ScreenDefinition::for_user_type(UserType::Admin);
        assert_eq!(users.name, "users");
        assert_eq!(users.singular(), "User");
        assert_eq!(users.columns.len(), 11);
        assert_eq!(users.columns.get("zip").map(|c| c.title.as_str()), Some("Zip Code"));
        assert!(!users.columns.get("address").is_some_and(|c| c.is_sortable()));
    }

    #[test]
    fn test_fetch_then_view_default_sort() {
        let (mut screen, notifier) = screen(UserType::Nurse);
        assert!(screen.needs_refetch());
        screen.apply_reference(Ok(reference()));
        screen.apply_fetch(Ok(nurses()));
        assert!(!screen.needs_refetch());

        let view = screen.view();
        assert_eq!(view.column("name"), vec!["Ann", "Bob"]);
        assert_eq!(view.column("state"), vec!["Ohio", "Texas"]);
        assert!(notifier.toasts().is_empty());
    }

    #[test]
    fn test_failed_fetch_keeps_records() {
        let (mut screen, notifier) = screen(UserType::Nurse);
        screen.apply_fetch(Ok(nurses()));
        screen.apply_fetch(Err(RosterError::request("connection refused")));

        assert_eq!(screen.view().total_items(), 2);
        let toasts = notifier.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert!(toasts[0].message.contains("Failed to load nurses"));
    }

    #[test]
    fn test_complete_mutation() {
        let (mut screen, notifier) = screen(UserType::Nurse);
        screen.apply_fetch(Ok(nurses()));

        screen.open_modal(ModalId::Edit("1".to_string()));
        assert_eq!(screen.active_modal().and_then(|m| m.target()), Some("1"));
        screen.complete_mutation(MutationKind::Edit, Err(RosterError::request("500")));
        assert!(screen.active_modal().is_some());
        assert!(!screen.needs_refetch());

        screen.complete_mutation(MutationKind::Edit, Ok(()));
        assert!(screen.active_modal().is_none());
        assert!(screen.needs_refetch());

        let toasts = notifier.drain();
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert!(toasts[0].message.starts_with("Failed to update nurse"));
        assert_eq!(toasts[1].message, "Nurse updated successfully");
    }

    #[test]
    fn test_select_state_cascades_into_grid() {
        let (mut screen, _) = screen(UserType::Nurse);
        screen.apply_reference(Ok(reference()));
        screen.apply_fetch(Ok(nurses()));

        screen.set_filters(PersonFilters::new().with_city("10"));
        assert_eq!(screen.view().column("name"), vec!["Bob"]);

        screen.select_state("2");
        assert_eq!(screen.filters().city_id, "");
        assert_eq!(screen.view().column("name"), vec!["Ann"]);

        screen.clear_filters();
        assert_eq!(screen.view().total_items(), 2);
    }

    #[test]
    fn test_role_options() {
        let (mut nurse_screen, _) = screen(UserType::Nurse);
        nurse_screen.apply_reference(Ok(reference()));
        let names: Vec<_> = nurse_screen.role_options().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Charge Nurse"]);

        let (mut patient_screen, _) = screen(UserType::Patient);
        patient_screen.apply_reference(Ok(reference()));
        assert!(patient_screen.role_options().is_empty());
    }

    #[test]
    fn test_saved_search_snapshot_and_apply() {
        let (mut screen, _) = screen(UserType::Nurse);
        screen.apply_fetch(Ok(nurses()));
        screen.set_filters(PersonFilters::new().with_status("inactive"));
        screen.grid_mut().toggle_sort(flatten::EMAIL);
        screen.set_search("ann");

        let saved = screen.snapshot_search("Inactive");
        assert_eq!(saved.filters.status, "inactive");
        assert_eq!(saved.search, "ann");

        screen.clear_filters();
        assert_eq!(screen.view().total_items(), 2);

        screen.apply_saved_search(&saved);
        let view = screen.view();
        assert_eq!(view.column("name"), vec!["Ann"]);
        assert_eq!(screen.grid().sort(), Some(&SortSpec::ascending(flatten::EMAIL)));
    }

    #[test]
    fn test_preference_key() {
        let (screen, _) = screen(UserType::Technician);
        assert_eq!(screen.preference_key(None).slug(), "local__technicians");
    }
}
