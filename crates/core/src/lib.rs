//! # Roster Core
//!
//! Core types, traits, and error handling for Clinic Roster.
//!
//! This crate provides the foundational building blocks shared by the
//! model, grid, and CLI crates, including:
//!
//! - **Types**: Person screen kinds (`UserType`), flattened cell values, sort direction
//! - **Traits**: Common behaviors like `Validatable` and `Persistable`
//! - **Errors**: Unified error handling with `RosterError` and `RosterResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ResultExt, RosterError, RosterResult};
pub use traits::{Identifiable, Named, Persistable, Timestamped, Validatable};
pub use types::{CellValue, SortDirection, UserType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
