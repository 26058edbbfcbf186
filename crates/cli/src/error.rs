//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map configuration, profile, period, and credential errors to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Every failure that happens before an export would start maps to a
//!   non-zero code; nothing partially resolved is used.

use olap_config::{ConfigError, CredentialError, ProfileError};
use olap_period::PeriodError;

use crate::commands::credentials::CredentialPromptError;

/// Structured exit codes for olap-export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Credentials could not be decrypted, read, or obtained.
    ///
    /// Scripts should re-run `credentials save` interactively.
    CredentialsFailed = 2,

    /// The named profile does not exist.
    NotFound = 4,

    /// A setting or period failed validation.
    ///
    /// Scripts should fix the input and not retry.
    ValidationError = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ProfileError> for ExitCode {
    fn from(err: &ProfileError) -> Self {
        match err {
            ProfileError::NotFound { .. } => ExitCode::NotFound,
            ProfileError::InvalidName { .. } => ExitCode::ValidationError,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::Validation { .. } | ConfigError::Period { .. } => {
                ExitCode::ValidationError
            }
            ConfigError::Profile(inner) => Self::from(inner),
            ConfigError::SettingsParse { .. } | ConfigError::SettingsShape { .. } => {
                ExitCode::ValidationError
            }
            _ => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(err);
            }
            if let Some(err) = cause.downcast_ref::<ProfileError>() {
                return ExitCode::from(err);
            }
            if cause.downcast_ref::<PeriodError>().is_some() {
                return ExitCode::ValidationError;
            }
            if cause.downcast_ref::<CredentialError>().is_some()
                || cause.downcast_ref::<CredentialPromptError>().is_some()
            {
                return ExitCode::CredentialsFailed;
            }
        }
        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::CredentialsFailed.as_i32(), 2);
        assert_eq!(ExitCode::NotFound.as_i32(), 4);
        assert_eq!(ExitCode::ValidationError.as_i32(), 5);
    }

    #[test]
    fn test_profile_not_found_through_config_error() {
        let err = anyhow::Error::new(ConfigError::Profile(ProfileError::NotFound {
            name: "weekly".to_string(),
            dir: PathBuf::from("profiles"),
        }));
        assert_eq!(err.exit_code(), ExitCode::NotFound);
    }

    #[test]
    fn test_validation_error_with_context() {
        let err = anyhow::Error::new(ConfigError::Validation {
            field: "query.timeout".to_string(),
            value: "-1".to_string(),
            message: "must be non-negative".to_string(),
        })
        .context("Failed to build configuration");
        assert_eq!(err.exit_code(), ExitCode::ValidationError);
    }

    #[test]
    fn test_period_error() {
        let err = anyhow::Error::new(PeriodError::NonPositiveCount { count: 0 });
        assert_eq!(err.exit_code(), ExitCode::ValidationError);
    }

    #[test]
    fn test_credential_errors() {
        let err = anyhow::Error::new(CredentialPromptError::NoTerminal {
            what: "Master password",
        });
        assert_eq!(err.exit_code(), ExitCode::CredentialsFailed);

        let err = anyhow::Error::new(CredentialError::Decrypt {
            path: PathBuf::from(".credentials"),
            reason: olap_config::DecryptFailure::KeyMismatch,
        });
        assert_eq!(err.exit_code(), ExitCode::CredentialsFailed);
    }

    #[test]
    fn test_unknown_error_is_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }
}
