//! Named profile storage.
//!
//! Responsibilities:
//! - Load a profile by name into a raw, migrated mapping.
//! - List, summarize, save, and delete profiles in a directory.
//! - Write the bundled example profiles.
//!
//! Does NOT handle:
//! - Type coercion or defaulting of profile values (see `loader`).
//!
//! Invariants:
//! - Profile names are validated before any path is built from them.
//! - Unknown top-level keys are preserved; the resolver decides relevance.
//! - A `secrets` section is never returned to callers.
//! - Writes are atomic (temp file + rename).

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use super::migration::{MigrationNotice, migrate_legacy_keys};
use super::write_atomic;
use crate::loader::fields::scalar_text;
use crate::loader::{describe_period, lookup_dotted};

const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Errors from the profile store.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile '{name}' not found in {dir}")]
    NotFound { name: String, dir: PathBuf },

    #[error("Invalid profile name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Failed to read profile at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Profile at {path} must be a YAML mapping")]
    Shape { path: PathBuf },

    #[error("Failed to write profile at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize profile '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A loaded profile: its name and migrated override mapping.
#[derive(Debug, Clone)]
pub struct RawProfile {
    name: String,
    root: Mapping,
    migrations: Vec<MigrationNotice>,
    secrets_ignored: bool,
}

impl RawProfile {
    /// Normalizes a parsed document the same way `ProfileStore::load` does.
    pub fn from_mapping(name: &str, mut root: Mapping) -> Self {
        let migrations = migrate_legacy_keys(&mut root, name);
        let secrets_ignored = root.remove("secrets").is_some();
        if secrets_ignored {
            tracing::warn!(
                profile = name,
                "Ignoring 'secrets' section in profile; secrets come from CLI or environment only"
            );
        }
        Self {
            name: name.to_string(),
            root,
            migrations,
            secrets_ignored,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.root.get("description").and_then(Value::as_str)
    }

    /// The full mapping after migration, unknown keys included.
    pub fn mapping(&self) -> &Mapping {
        &self.root
    }

    /// Value at a dotted `section.key` path; null counts as absent.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_dotted(&self.root, path)
    }

    pub fn period_section(&self) -> Option<&Value> {
        self.root.get("period").filter(|v| !v.is_null())
    }

    pub fn schedule_section(&self) -> Option<&Value> {
        self.root.get("schedule").filter(|v| !v.is_null())
    }

    /// Legacy keys rewritten during load.
    pub fn migrations(&self) -> &[MigrationNotice] {
        &self.migrations
    }

    pub fn secrets_ignored(&self) -> bool {
        self.secrets_ignored
    }
}

/// One row of `profiles list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub description: Option<String>,
    pub period: String,
    pub format: Option<String>,
}

/// A directory of `<name>.yaml` profile files.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

/// Strips a trailing extension and rejects names that could escape the directory.
fn validate_name(name: &str) -> Result<&str, ProfileError> {
    let trimmed = name.trim();
    let stem = EXTENSIONS
        .iter()
        .find_map(|ext| {
            trimmed
                .strip_suffix(ext)
                .and_then(|rest| rest.strip_suffix('.'))
        })
        .unwrap_or(trimmed);

    let invalid = |reason| ProfileError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if stem.is_empty() {
        return Err(invalid("name is empty"));
    }
    if stem.contains(['/', '\\']) {
        return Err(invalid("name must not contain path separators"));
    }
    if stem.contains("..") {
        return Err(invalid("name must not contain '..'"));
    }
    if stem.starts_with('.') {
        return Err(invalid("name must not start with '.'"));
    }
    Ok(stem)
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn existing_path(&self, stem: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
    }

    fn not_found(&self, stem: &str) -> ProfileError {
        ProfileError::NotFound {
            name: stem.to_string(),
            dir: self.dir.clone(),
        }
    }

    /// Reads a profile, migrating legacy keys.
    pub fn load(&self, name: &str) -> Result<RawProfile, ProfileError> {
        let stem = validate_name(name)?;
        let path = self
            .existing_path(stem)
            .ok_or_else(|| self.not_found(stem))?;

        let root = read_mapping(&path)?;
        let profile = RawProfile::from_mapping(stem, root);
        tracing::debug!(
            profile = stem,
            path = %path.display(),
            migrated = profile.migrations().len(),
            "Loaded profile"
        );
        Ok(profile)
    }

    /// Sorted names of every profile file in the directory.
    pub fn list(&self) -> Result<Vec<String>, ProfileError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ProfileError::Read {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| EXTENSIONS.contains(&ext))
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// A summary of each loadable profile; unreadable ones are logged and skipped.
    pub fn summaries(&self) -> Result<Vec<ProfileSummary>, ProfileError> {
        let mut summaries = Vec::new();
        for name in self.list()? {
            match self.load(&name) {
                Ok(profile) => summaries.push(ProfileSummary {
                    description: profile.description().map(str::to_string),
                    period: describe_period(&profile),
                    format: profile.lookup("export.format").and_then(scalar_text),
                    name,
                }),
                Err(e) => {
                    tracing::warn!(profile = %name, error = %e, "Skipping unreadable profile");
                }
            }
        }
        Ok(summaries)
    }

    /// Writes a profile, stamping `created` on first save and `updated` always.
    pub fn save(&self, name: &str, mut mapping: Mapping) -> Result<PathBuf, ProfileError> {
        let stem = validate_name(name)?;
        let existing = self.existing_path(stem);
        let path = existing
            .clone()
            .unwrap_or_else(|| self.dir.join(format!("{stem}.yaml")));

        let now = chrono::Local::now().to_rfc3339();
        let created = existing
            .as_deref()
            .and_then(|p| read_mapping(p).ok())
            .and_then(|old| old.get("created").cloned())
            .unwrap_or_else(|| Value::String(now.clone()));

        if !mapping.contains_key("name") {
            mapping.insert(Value::from("name"), Value::from(stem));
        }
        mapping.insert(Value::from("created"), created);
        mapping.insert(Value::from("updated"), Value::String(now));

        let text = serde_yaml::to_string(&mapping).map_err(|source| ProfileError::Serialize {
            name: stem.to_string(),
            source,
        })?;
        write_atomic(&path, text.as_bytes(), false).map_err(|source| ProfileError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!(profile = stem, path = %path.display(), "Profile saved");
        Ok(path)
    }

    /// Removes a profile file.
    pub fn delete(&self, name: &str) -> Result<PathBuf, ProfileError> {
        let stem = validate_name(name)?;
        let path = self
            .existing_path(stem)
            .ok_or_else(|| self.not_found(stem))?;
        std::fs::remove_file(&path).map_err(|source| ProfileError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(profile = stem, "Profile deleted");
        Ok(path)
    }

    /// Writes the bundled examples, leaving existing profiles of the same name alone.
    ///
    /// Returns the names that were written.
    pub fn write_examples(&self) -> Result<Vec<String>, ProfileError> {
        let mut written = Vec::new();
        for (name, text) in EXAMPLE_PROFILES {
            if self.existing_path(name).is_some() {
                tracing::debug!(profile = name, "Example profile already exists");
                continue;
            }
            let mapping: Mapping =
                serde_yaml::from_str(text).map_err(|source| ProfileError::Parse {
                    path: PathBuf::from(format!("<example {name}>")),
                    source,
                })?;
            self.save(name, mapping)?;
            written.push(name.to_string());
        }
        Ok(written)
    }
}

fn read_mapping(path: &Path) -> Result<Mapping, ProfileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&content).map_err(|source| ProfileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(ProfileError::Shape {
            path: path.to_path_buf(),
        }),
    }
}

const EXAMPLE_PROFILES: [(&str, &str); 3] = [
    (
        "weekly_sales",
        r#"description: Weekly consumer electronics sales
period:
  type: auto
  auto_type: last-weeks
  auto_value: 1
export:
  format: xlsx
  compress: zip
xlsx:
  streaming: false
  min_format: false
query:
  filter_fg1_name: Consumer Electronics
  timeout: 30
"#,
    ),
    (
        "monthly_report",
        r#"description: Report for the current month
period:
  type: auto
  auto_type: current-month
export:
  format: both
  compress: zip
xlsx:
  streaming: true
  min_format: false
query:
  filter_fg1_name: Consumer Electronics
  timeout: 60
schedule:
  enabled: true
  cron: "0 9 1 * *"
  description: First day of every month at 09:00
"#,
    ),
    (
        "quarterly_analysis",
        r#"description: Analysis of the previous quarter
period:
  type: auto
  auto_type: last-quarter
export:
  format: xlsx
  compress: zip
xlsx:
  streaming: true
  min_format: false
query:
  filter_fg1_name: Consumer Electronics
  timeout: 90
"#,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("profiles"));
        (dir, store)
    }

    fn write(store: &ProfileStore, file: &str, content: &str) {
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join(file), content).unwrap();
    }

    #[test]
    fn test_load_missing_profile_is_not_found() {
        let (_dir, store) = store();
        let err = store.load("ghost").unwrap_err();
        assert!(matches!(err, ProfileError::NotFound { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn test_load_preserves_unknown_keys_and_migrates() {
        let (_dir, store) = store();
        write(
            &store,
            "weekly.yaml",
            "description: Weekly\ncustom_key: 1\nconnection:\n  timeout: 45\n",
        );

        let profile = store.load("weekly").unwrap();
        assert_eq!(profile.name(), "weekly");
        assert_eq!(profile.description(), Some("Weekly"));
        assert!(profile.mapping().contains_key("custom_key"));
        assert_eq!(profile.lookup("query.timeout"), Some(&Value::from(45)));
        assert_eq!(profile.migrations().len(), 1);
    }

    #[test]
    fn test_load_accepts_yml_and_extension_in_name() {
        let (_dir, store) = store();
        write(&store, "short.yml", "export:\n  format: csv\n");
        assert!(store.load("short").is_ok());
        assert!(store.load("short.yml").is_ok());
    }

    #[test]
    fn test_secrets_section_is_removed() {
        let (_dir, store) = store();
        write(&store, "leaky.yaml", "secrets:\n  server: cube\n");
        let profile = store.load("leaky").unwrap();
        assert!(profile.secrets_ignored());
        assert!(profile.lookup("secrets.server").is_none());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let (_dir, store) = store();
        for bad in ["", "../etc/passwd", "a/b", "a\\b", ".hidden", "  "] {
            assert!(
                matches!(store.load(bad), Err(ProfileError::InvalidName { .. })),
                "expected InvalidName for {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_errors_surface() {
        let (_dir, store) = store();
        write(&store, "broken.yaml", "period: [unclosed\n");
        write(&store, "list.yaml", "- a\n- b\n");
        assert!(matches!(
            store.load("broken"),
            Err(ProfileError::Parse { .. })
        ));
        assert!(matches!(store.load("list"), Err(ProfileError::Shape { .. })));
    }

    #[test]
    fn test_list_is_sorted_and_ignores_other_files() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
        write(&store, "b.yaml", "{}");
        write(&store, "a.yml", "{}");
        write(&store, "notes.txt", "ignored");
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_save_stamps_created_once() {
        let (_dir, store) = store();
        let mapping: Mapping = serde_yaml::from_str("description: First\n").unwrap();
        let path = store.save("stamped", mapping).unwrap();

        let first = read_mapping(&path).unwrap();
        let created = first.get("created").cloned().unwrap();
        assert_eq!(first.get("name"), Some(&Value::from("stamped")));
        assert!(first.get("updated").is_some());

        let mapping: Mapping = serde_yaml::from_str("description: Second\n").unwrap();
        store.save("stamped", mapping).unwrap();
        let second = read_mapping(&path).unwrap();
        assert_eq!(second.get("created"), Some(&created));
        assert_eq!(second.get("description"), Some(&Value::from("Second")));
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        write(&store, "gone.yaml", "{}");
        store.delete("gone").unwrap();
        assert!(matches!(
            store.delete("gone"),
            Err(ProfileError::NotFound { .. })
        ));
    }

    #[test]
    fn test_write_examples_and_summaries() {
        let (_dir, store) = store();
        let written = store.write_examples().unwrap();
        assert_eq!(
            written,
            vec!["weekly_sales", "monthly_report", "quarterly_analysis"]
        );
        assert!(store.write_examples().unwrap().is_empty());

        let summaries = store.summaries().unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["monthly_report", "quarterly_analysis", "weekly_sales"]
        );
        let monthly = &summaries[0];
        assert_eq!(monthly.period, "current-month");
        assert_eq!(monthly.format.as_deref(), Some("both"));
        assert_eq!(summaries[2].period, "last-weeks (1)");
    }

    #[test]
    fn test_summaries_skip_unreadable_profiles() {
        let (_dir, store) = store();
        write(&store, "good.yaml", "description: ok\n");
        write(&store, "bad.yaml", "period: [unclosed\n");
        let summaries = store.summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "good");
        assert_eq!(summaries[0].period, "current week");
    }
}
