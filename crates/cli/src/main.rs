//! olap-export - Weekly OLAP cube export driver.
//!
//! Responsibilities:
//! - Parse command-line arguments and load `.env`.
//! - Resolve configuration, periods, and credentials for an export run.
//! - Report results as tables or JSON and exit with a structured code.
//!
//! Does NOT handle:
//! - Configuration precedence or validation (see `olap_config`).
//! - ISO week arithmetic (see `olap_period`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` values are visible
//!   to everything that reads the environment afterwards.
//! - Command output goes to stdout; logs and notices go to stderr.

mod args;
mod commands;
mod config_context;
mod dispatch;
mod error;
mod formatters;
mod interactive;
mod logging;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};

fn main() {
    if let Err(e) = olap_config::load_dotenv() {
        eprintln!("Failed to load environment: {e}");
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();
    let log = logging::init(cli.debug);

    if let Err(e) = run_command(cli, &log) {
        eprintln!("Error: {e:#}");
        std::process::exit(e.exit_code().as_i32());
    }
}
