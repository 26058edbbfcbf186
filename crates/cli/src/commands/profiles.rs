//! Profile management commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use olap_config::{ProfileError, ProfileStore};

use crate::args::OutputFormat;
use crate::formatters::render_table;
use crate::interactive;

#[derive(Subcommand, Debug, Clone)]
pub enum ProfilesCommand {
    /// List profiles with their period and format
    List,

    /// Print one profile after legacy keys are migrated
    Show {
        /// Profile name (with or without .yaml)
        name: String,
    },

    /// Write the example profiles into the profiles directory
    Init,

    /// Delete a profile
    Delete {
        /// Profile name (with or without .yaml)
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(command: ProfilesCommand, store: &ProfileStore, output: OutputFormat) -> Result<()> {
    match command {
        ProfilesCommand::List => run_list(store, output),
        ProfilesCommand::Show { name } => run_show(store, &name, output),
        ProfilesCommand::Init => run_init(store),
        ProfilesCommand::Delete { name, yes } => run_delete(store, &name, yes),
    }
}

fn run_list(store: &ProfileStore, output: OutputFormat) -> Result<()> {
    let summaries = store.summaries()?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Table => {
            if summaries.is_empty() {
                println!(
                    "No profiles in {}. Run 'olap-export profiles init' to create examples.",
                    store.dir().display()
                );
                return Ok(());
            }
            let rows: Vec<Vec<String>> = summaries
                .into_iter()
                .map(|s| {
                    vec![
                        s.name,
                        s.period,
                        s.format.unwrap_or_else(|| "-".to_string()),
                        s.description.unwrap_or_default(),
                    ]
                })
                .collect();
            println!(
                "{}",
                render_table(&["NAME", "PERIOD", "FORMAT", "DESCRIPTION"], &rows)
            );
        }
    }
    Ok(())
}

fn run_show(store: &ProfileStore, name: &str, output: OutputFormat) -> Result<()> {
    let profile = store.load(name)?;

    // Migrated legacy keys were already reported by the store as warnings.
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(profile.mapping())?),
        OutputFormat::Table => {
            let text = serde_yaml::to_string(profile.mapping())
                .with_context(|| format!("Failed to render profile '{}'", profile.name()))?;
            print!("{text}");
        }
    }
    Ok(())
}

fn run_init(store: &ProfileStore) -> Result<()> {
    let written = store.write_examples()?;
    if written.is_empty() {
        println!("Example profiles already present in {}", store.dir().display());
    } else {
        for name in &written {
            println!("Created profile '{name}'");
        }
    }
    Ok(())
}

fn run_delete(store: &ProfileStore, name: &str, yes: bool) -> Result<()> {
    // Fail on an unknown name before asking anything; unparsable files can still go.
    if let Err(e @ (ProfileError::NotFound { .. } | ProfileError::InvalidName { .. })) =
        store.load(name)
    {
        return Err(e.into());
    }

    if !yes && !interactive::confirm_delete(name, "profile")? {
        return Ok(());
    }
    let path = store.delete(name)?;
    println!("Deleted {}", path.display());
    Ok(())
}
