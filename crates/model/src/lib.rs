//! # Roster Model
//!
//! The data the grid works over: person records as fetched, the reference
//! lookup tables used to resolve names, flattened rows, column
//! descriptors, and the grid configuration.
//!
//! ## Core Concepts
//!
//! - **Record**: an opaque person object with a nested profile (`record.nurse`)
//! - **ReferenceData**: states, cities and roles, indexed by id
//! - **FlatRow**: a record projected to top-level `*_flat` fields
//! - **ColumnDescriptor**: what a grid column reads, renders and sorts by
//! - **GridConfig**: page sizes, default sort, preference location
//!

// Module declarations
pub mod column;
pub mod config;
pub mod listing;
pub mod record;
pub mod reference;
pub mod row;

// Re-export commonly used types at crate root
pub use column::{CellRenderer, ColumnDescriptor, format_timestamp};
pub use config::{CONFIG_FILE_NAME, GridConfig};
pub use listing::{listing_from_value, load_listing, parse_listing};
pub use record::{Record, scalar_text, truthy};
pub use reference::{
    City, ReferenceData, Role, State, parse_cities, parse_reference_list, parse_roles,
    parse_states,
};
pub use row::FlatRow;

// Re-export core types that are commonly used with the model
pub use roster_core::{CellValue, RosterError, RosterResult, SortDirection, UserType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
