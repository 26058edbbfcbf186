//! Configuration loading for command execution.
//!
//! Responsibilities:
//! - Build the `AppConfig` from parsed flags, process environment, the settings
//!   file, and the selected profile.
//! - Locate the profile store for profile management commands.
//!
//! Does NOT handle:
//! - `.env` loading (done in `main()` before parsing).
//!
//! Invariants:
//! - Process environment is captured exactly once per run, here.

use anyhow::{Context, Result};
use olap_config::constants::DEFAULT_PROFILES_DIR;
use olap_config::{AppConfig, ConfigLoader, EnvMap, ProfileStore};

use crate::args::Cli;

/// Resolves the full configuration for this run.
pub(crate) fn load_config(cli: &Cli) -> Result<AppConfig> {
    let overrides = cli.overrides().context("Invalid period flags")?;

    let mut loader = ConfigLoader::new()
        .with_cli(overrides)
        .with_env(EnvMap::from_process());
    if let Some(path) = &cli.config_path {
        loader = loader.with_settings_path(path.clone());
    }
    if let Some(dir) = &cli.profiles_dir {
        loader = loader.with_profiles_dir(dir.clone());
    }
    if let Some(name) = &cli.profile {
        loader = loader.with_profile_name(name.clone());
    }

    let config = loader.build().context("Failed to build configuration")?;
    tracing::debug!(
        profile = config.profile(),
        notices = config.notices().len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// The profile directory selected by `--profiles-dir`, or `profiles/`.
pub(crate) fn profile_store(cli: &Cli) -> ProfileStore {
    ProfileStore::new(
        cli.profiles_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILES_DIR.into()),
    )
}
