//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the command handlers.
//! - Resolve configuration for commands that need it.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Building the configuration (see `config_context`).
//!
//! Invariants:
//! - `plan` runs when no subcommand is given.
//! - Relative periods are computed against one "today" per run.

use anyhow::Result;
use olap_config::AppConfig;
use olap_period::{Clock, SystemClock};

use crate::args::{Cli, Commands};
use crate::commands;
use crate::commands::credentials::CredentialsCommand;
use crate::config_context::{load_config, profile_store};
use crate::logging::LogHandle;

pub(crate) fn run_command(cli: Cli, log: &LogHandle) -> Result<()> {
    let resolve = || -> Result<AppConfig> {
        let config = load_config(&cli)?;
        if config.display().debug {
            log.enable_debug();
        }
        Ok(config)
    };

    match &cli.command {
        None | Some(Commands::Plan) => {
            let config = resolve()?;
            let as_of = cli.as_of.unwrap_or_else(|| SystemClock.today());
            commands::plan::run(&config, as_of, cli.available_weeks.as_deref(), cli.output)?;
        }
        Some(Commands::Profiles { command }) => {
            commands::profiles::run(command.clone(), &profile_store(&cli), cli.output)?;
        }
        Some(Commands::Credentials { command }) => {
            commands::credentials::run(command.clone(), &resolve()?, cli.output)?;
        }
        Some(Commands::ClearCredentials) => {
            commands::credentials::run(CredentialsCommand::Clear, &resolve()?, cli.output)?;
        }
    }
    Ok(())
}
