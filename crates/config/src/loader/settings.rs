//! The base settings file.
//!
//! Responsibilities:
//! - Read `config.yaml` (or another path) into a section mapping.
//! - Drop any `secrets` section, which is never allowed to come from a file.
//!
//! Does NOT handle:
//! - Coercion or defaulting; values stay raw until the resolver asks for them.
//!
//! Invariants:
//! - A missing settings file is the same as an empty one.
//! - The settings file is read-only input.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::error::ConfigError;

const SECRETS_SECTION: &str = "secrets";

/// Resolves a dotted `section.key` path in a section mapping.
///
/// Null values count as absent.
pub(crate) fn lookup_dotted<'a>(root: &'a Mapping, path: &str) -> Option<&'a Value> {
    let (section, key) = path.split_once('.')?;
    let value = root.get(section)?.as_mapping()?.get(key)?;
    (!value.is_null()).then_some(value)
}

/// Parsed contents of the base settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsFile {
    path: Option<PathBuf>,
    root: Mapping,
    secrets_ignored: bool,
}

impl SettingsFile {
    /// An empty settings file; every field falls through to its default.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads and parses the file at `path`. A missing file yields an empty one.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file; using defaults");
                return Ok(Self {
                    path: Some(path.to_path_buf()),
                    ..Self::default()
                });
            }
            Err(source) => {
                return Err(ConfigError::SettingsRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut settings = Self::parse(&content, path)?;
        settings.path = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            sections = settings.root.len(),
            "Loaded settings file"
        );
        Ok(settings)
    }

    /// Parses settings from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|source| ConfigError::SettingsParse {
                path: origin.to_path_buf(),
                source,
            })?;

        let mut root = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(ConfigError::SettingsShape {
                    path: origin.to_path_buf(),
                });
            }
        };

        let secrets_ignored = root.remove(SECRETS_SECTION).is_some();
        if secrets_ignored {
            tracing::warn!(
                path = %origin.display(),
                "Ignoring 'secrets' section in settings file; secrets come from CLI or environment only"
            );
        }

        Ok(Self {
            path: None,
            root,
            secrets_ignored,
        })
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_dotted(&self.root, path)
    }

    /// Whether a `secrets` section was present and discarded.
    pub fn secrets_ignored(&self) -> bool {
        self.secrets_ignored
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
