//! Configuration management for the OLAP export tool.
//!
//! This crate resolves the export tool's settings from CLI overrides, named
//! profiles, environment variables, and a base settings file, and stores
//! connection credentials encrypted at rest.

pub mod constants;
pub mod credentials;
mod loader;
pub mod persistence;
pub mod types;

pub use credentials::{
    CredentialError, CredentialRecord, CredentialVault, DecryptFailure, MachineFingerprint,
};
pub use loader::{
    CliOverrides, ConfigError, ConfigLoader, EnvMap, SettingsFile, Source,
    env_var_or_none, fields, load_dotenv, resolve,
};
pub use persistence::{MigrationNotice, ProfileError, ProfileStore, ProfileSummary, RawProfile};
pub use types::{
    AppConfig, AuthMethod, Compression, ConfigNotice, CsvQuoting, ExportFormat, ScheduleIntent,
};
