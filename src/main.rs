//! Clinic Roster
//!
//! Sortable, filterable, paginated person grids for clinic back-office
//! screens, driven from the command line.

use roster_cli::clap::Parser;
use roster_cli::{Cli, execute};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Log level for the number of `-v` flags
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{}", roster_cli::NAME, roster_cli::VERSION);

    let mut stdout = std::io::stdout().lock();
    match execute(&cli, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
