//! # Roster Grid
//!
//! The table engine behind every person screen, plus the screen state
//! around it.
//!
//! ## Pipeline
//!
//! Records are flattened against the reference tables, then filtered,
//! searched, sorted, projected to the visible columns and paginated. One
//! generic [`GridState`] serves all five screens; a screen differs only in
//! its flattener and column list.
//!
//! ```rust,ignore
//! use roster_grid::{GridState, ProfileFlattener, ScreenDefinition};
//! use roster_core::UserType;
//!
//! let screen = ScreenDefinition::for_user_type(UserType::Nurse);
//! let mut grid = GridState::new(ProfileFlattener::new(UserType::Nurse), screen.columns);
//! grid.set_records(records);
//! let page = grid.view();
//! ```
//!
//! ## Around the pipeline
//!
//! - **screen**: modal state, fetch and mutation outcomes, role options
//! - **csv**: export of the filtered list, bulk import validation
//! - **preferences**: visible columns and saved searches per user and screen
//! - **notify**: the toast sink screens report to
//!

// Module declarations
pub mod csv;
pub mod filter;
pub mod flatten;
pub mod notify;
pub mod paginate;
pub mod pipeline;
pub mod preferences;
pub mod project;
pub mod screen;
pub mod search;
pub mod sort;

// Re-export commonly used types at crate root
pub use csv::{
    AcceptedRow, ImportReport, ImportRow, ImportValidator, RejectedRow, export_csv,
    export_file_name, parse_import, split_csv_line, split_records, validate_import,
};
pub use filter::{FieldFilter, FilterOp, FilterSet, PersonFilters, StatusFilter};
pub use flatten::{Flattener, ProfileFlattener, flatten_all};
pub use notify::{MemoryNotifier, Notifier, Toast, ToastLevel, TracingNotifier};
pub use paginate::{PageInfo, PageWindow};
pub use pipeline::{GridState, GridView};
pub use preferences::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceDocument, PreferenceKey,
    PreferenceStore, SavedSearch,
};
pub use project::{ColumnSet, HeaderCell, RenderedRow};
pub use screen::{ModalId, MutationKind, Screen, ScreenDefinition};
pub use search::{DEFAULT_SEARCH_FIELDS, apply_search, matches_search};
pub use sort::{SortSpec, sort_rows};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
