//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for all configuration resolution failures.
//! - Provide conversion from profile store errors.
//!
//! Does NOT handle:
//! - Credential vault failures (see `credentials`).
//!
//! Invariants:
//! - Validation errors name the dotted field path and the offending value.
//! - Values of secret fields are rendered as `<redacted>`.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;

use olap_period::PeriodError;
use thiserror::Error;

use super::fields::{FieldSpec, Scope};
use crate::persistence::ProfileError;

/// Placeholder shown instead of a secret value.
pub(crate) const REDACTED: &str = "<redacted>";

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field value failed coercion or a validation rule.
    #[error("Invalid value for {field}: '{value}': {message}")]
    Validation {
        field: String,
        value: String,
        message: String,
    },

    #[error("Invalid period in {field}: {source}")]
    Period {
        field: String,
        #[source]
        source: PeriodError,
    },

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Failed to read settings file at {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file at {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Settings file at {path} must be a mapping of section names")]
    SettingsShape { path: PathBuf },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    /// Builds a validation error for `field`, hiding the value of secret fields.
    pub(crate) fn invalid(
        field: &FieldSpec,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let value = match field.scope {
            Scope::Secret => REDACTED.to_string(),
            Scope::General => value.into(),
        };
        ConfigError::Validation {
            field: field.path.to_string(),
            value,
            message: message.into(),
        }
    }

    /// The dotted field path, for errors tied to one field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Validation { field, .. } | ConfigError::Period { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}
