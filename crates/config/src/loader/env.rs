//! Environment input for configuration.
//!
//! Responsibilities:
//! - Snapshot the process environment once into an [`EnvMap`].
//! - Load `.env` files, honouring the `DOTENV_DISABLED` gate.
//!
//! Does NOT handle:
//! - Deciding which keys are deprecated or which field they feed (see `fields.rs`).
//!
//! Invariants:
//! - `EnvMap::from_process` and `env_var_or_none` are the only places that read
//!   process environment; the resolver only ever sees an `EnvMap`.
//! - Empty or whitespace-only values are treated as unset.
//! - Stored values are trimmed (leading/trailing whitespace removed).

use std::collections::BTreeMap;

use super::error::ConfigError;
use crate::constants::ENV_DOTENV_DISABLED;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(normalize)
}

fn normalize(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// An immutable snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    vars: BTreeMap<String, String>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| {
                let key = key.into_string().ok()?;
                let value = normalize(value.into_string().ok()?)?;
                Some((key, value))
            })
            .collect();
        Self { vars }
    }

    /// Builds a map from explicit pairs, applying the same trimming rules.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .filter_map(|(key, value)| Some((key.into(), normalize(value.into())?)))
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Check if dotenv loading is disabled via environment variable.
fn dotenv_disabled() -> bool {
    matches!(
        env_var_or_none(ENV_DOTENV_DISABLED)
            .map(|v| v.to_ascii_lowercase())
            .as_deref(),
        Some("true") | Some("1")
    )
}

/// Load environment variables from a `.env` file in the working directory.
///
/// Missing `.env` files are silently ignored. Nothing is loaded when
/// `DOTENV_DISABLED` is `true` or `1`.
///
/// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        tracing::debug!("Skipping .env loading (DOTENV_DISABLED)");
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if is_not_found(&e) => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => Err(ConfigError::DotenvParse { error_index: idx }),
        Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}

/// Check if a dotenv error indicates the file was not found.
fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}
