//! Configuration resolution from CLI, profile, environment, and file inputs.
//!
//! Responsibilities:
//! - Merge CLI overrides, a named profile, legacy environment keys, the base
//!   settings file, and built-in defaults into one `AppConfig`, field by field.
//! - Resolve the period and schedule intents as units.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Does NOT handle:
//! - Persisting anything (profiles are written by `persistence`).
//! - Credentials at rest (see `credentials`).
//!
//! Invariants / Assumptions:
//! - Resolution is a pure function of its inputs; process environment is only
//!   read through `EnvMap::from_process`.
//! - Secrets resolve from CLI and environment only.

mod builder;
mod cli;
mod env;
mod error;
pub mod fields;
mod period;
mod providers;
mod settings;

#[cfg(test)]
mod tests;

pub use builder::{ConfigLoader, resolve};
pub use cli::CliOverrides;
pub use env::{EnvMap, env_var_or_none, load_dotenv};
pub use error::ConfigError;
pub use providers::Source;
pub use settings::SettingsFile;

pub(crate) use period::describe_period;
pub(crate) use settings::lookup_dotted;
