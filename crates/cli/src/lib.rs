//! # Roster CLI
//!
//! Command-line interface for Clinic Roster.
//!
//! Runs a person screen over exported JSON listings without the web UI:
//! the same flatten, filter, search, sort and paginate pipeline, CSV export
//! and import validation, and the per-user column and saved-search
//! preferences.
//!
//! ## Commands
//!
//! - `list` - Print one page of a screen as a table
//! - `export` - Write the filtered, sorted list as CSV
//! - `import` - Validate a CSV file for bulk creation
//! - `columns` - Show or change the visible columns of a screen
//! - `searches` - List, save or delete saved searches
//!

pub mod commands;
pub mod table;

use clap::{ArgAction, Args, Parser, Subcommand};
use roster_core::UserType;
use roster_grid::PersonFilters;
use std::path::PathBuf;

// Re-export dependencies for use in main.rs
pub use clap;
pub use commands::execute;
pub use roster_core;
pub use roster_grid;
pub use roster_model;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

/// Clinic Roster command line
#[derive(Debug, Parser)]
#[command(name = "clinic-roster", version, about = "Sortable, filterable person grids for clinic back-office screens")]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "CLINIC_ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Signed-in user id for preferences (defaults to the config value)
    #[arg(long, global = true, env = "CLINIC_ROSTER_USER")]
    pub user: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one page of a screen as a table
    List(ListArgs),
    /// Write the filtered, sorted list as CSV
    Export(ExportArgs),
    /// Validate a CSV file for bulk creation
    Import(ImportArgs),
    /// Show or change the visible columns of a screen
    Columns(ColumnsArgs),
    /// Manage saved searches of a screen
    Searches(SearchesArgs),
}

fn parse_user_type(value: &str) -> Result<UserType, String> {
    value.parse().map_err(|e: roster_core::RosterError| e.to_string())
}

/// Which screen to operate on
#[derive(Debug, Clone, Args)]
pub struct ScreenArg {
    /// Screen: users, nurses, patients, providers or technicians
    #[arg(short, long, value_parser = parse_user_type)]
    pub screen: UserType,
}

/// Reference lookup tables
#[derive(Debug, Clone, Default, Args)]
pub struct ReferenceArgs {
    /// States JSON file
    #[arg(long)]
    pub states: Option<PathBuf>,

    /// Cities JSON file
    #[arg(long)]
    pub cities: Option<PathBuf>,

    /// Roles JSON file
    #[arg(long)]
    pub roles: Option<PathBuf>,
}

/// Records and reference data for a screen
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    #[command(flatten)]
    pub screen: ScreenArg,

    /// Records JSON file, as returned by the listing endpoint
    #[arg(short, long)]
    pub records: PathBuf,

    #[command(flatten)]
    pub reference: ReferenceArgs,
}

/// Filters, search text and sort
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Free-text search across the screen's search fields
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub role_id: Option<String>,

    #[arg(long)]
    pub state_id: Option<String>,

    #[arg(long)]
    pub city_id: Option<String>,

    /// active or inactive
    #[arg(long)]
    pub status: Option<String>,

    /// Column id to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Start from a saved search
    #[arg(long)]
    pub saved: Option<String>,
}

impl QueryArgs {
    /// Overlay the given filter flags on `base`
    pub fn filters(&self, base: PersonFilters) -> PersonFilters {
        let pick = |flag: &Option<String>, current: String| flag.clone().unwrap_or(current);
        PersonFilters {
            name: pick(&self.name, base.name),
            email: pick(&self.email, base.email),
            phone: pick(&self.phone, base.phone),
            role_id: pick(&self.role_id, base.role_id),
            state_id: pick(&self.state_id, base.state_id),
            city_id: pick(&self.city_id, base.city_id),
            status: pick(&self.status, base.status),
        }
    }

    /// Whether any filter flag was given
    pub fn has_filters(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.role_id,
            &self.state_id,
            &self.city_id,
            &self.status,
        ]
        .iter()
        .any(|flag| flag.is_some())
    }
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Page to show (1-based, clamped to the last page)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to the config value)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Visible column ids for this run, comma separated
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Output file or directory; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Visible column ids for this run, comma separated
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub screen: ScreenArg,

    /// CSV file to validate
    #[arg(short, long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub reference: ReferenceArgs,

    /// Print the accepted create payloads as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub screen: ScreenArg,

    /// Save the visible column ids, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "reset")]
    pub set: Option<Vec<String>>,

    /// Forget the saved column set and show every column
    #[arg(long)]
    pub reset: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SearchesArgs {
    #[command(flatten)]
    pub screen: ScreenArg,

    #[command(subcommand)]
    pub action: SearchAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SearchAction {
    /// List saved searches
    List,
    /// Save the given filters, search text and sort under a name
    Save {
        #[arg(value_name = "NAME")]
        label: String,

        #[command(flatten)]
        query: QueryArgs,
    },
    /// Delete a saved search
    Delete { name: String },
}

// ============================================================================
// Tests
// ============================================================================
