//! Ordered value providers.
//!
//! Each input (CLI, profile, environment, settings file, built-in defaults) is a
//! [`ValueProvider`]. The resolver asks them in priority order and takes the
//! first one that explicitly supplies the field.
//!
//! Invariants:
//! - A provider that does not explicitly supply a field returns `None`; an
//!   unpassed CLI flag or a null YAML value is "not supplied".
//! - Profile and settings-file providers never answer for `Scope::Secret` fields.

use std::fmt;

use serde_yaml::Value;

use super::cli::CliOverrides;
use super::env::EnvMap;
use super::fields::{FieldSpec, Scope};
use super::settings::SettingsFile;
use crate::persistence::RawProfile;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cli,
    Profile,
    Env,
    SettingsFile,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Cli => "command line",
            Source::Profile => "profile",
            Source::Env => "environment",
            Source::SettingsFile => "settings file",
            Source::Default => "default",
        })
    }
}

/// One configuration input.
pub(crate) trait ValueProvider {
    fn source(&self) -> Source;

    /// The raw value this provider explicitly supplies for `field`.
    fn lookup(&self, field: &FieldSpec) -> Option<Value>;
}

pub(crate) struct CliProvider<'a>(pub &'a CliOverrides);

impl ValueProvider for CliProvider<'_> {
    fn source(&self) -> Source {
        Source::Cli
    }

    fn lookup(&self, field: &FieldSpec) -> Option<Value> {
        self.0
            .explicit(field.path)
            .map(|value| Value::String(value.to_string()))
    }
}

pub(crate) struct ProfileProvider<'a>(pub &'a RawProfile);

impl ValueProvider for ProfileProvider<'_> {
    fn source(&self) -> Source {
        Source::Profile
    }

    fn lookup(&self, field: &FieldSpec) -> Option<Value> {
        if field.scope == Scope::Secret {
            return None;
        }
        self.0.lookup(field.path).cloned()
    }
}

pub(crate) struct EnvProvider<'a>(pub &'a EnvMap);

impl ValueProvider for EnvProvider<'_> {
    fn source(&self) -> Source {
        Source::Env
    }

    fn lookup(&self, field: &FieldSpec) -> Option<Value> {
        let key = field.env?;
        self.0
            .get(key.name)
            .map(|value| Value::String(value.to_string()))
    }
}

pub(crate) struct SettingsProvider<'a>(pub &'a SettingsFile);

impl ValueProvider for SettingsProvider<'_> {
    fn source(&self) -> Source {
        Source::SettingsFile
    }

    fn lookup(&self, field: &FieldSpec) -> Option<Value> {
        if field.scope == Scope::Secret {
            return None;
        }
        self.0.lookup(field.path).cloned()
    }
}

pub(crate) struct DefaultProvider;

impl ValueProvider for DefaultProvider {
    fn source(&self) -> Source {
        Source::Default
    }

    fn lookup(&self, field: &FieldSpec) -> Option<Value> {
        field.default.map(|value| Value::String(value.to_string()))
    }
}
