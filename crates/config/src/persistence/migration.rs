//! Legacy profile key migration.
//!
//! Responsibilities:
//! - Move values from deprecated key paths to their canonical section/field.
//! - Report each migrated key exactly once per profile load.
//!
//! Does NOT handle:
//! - Environment key deprecation (see `loader::fields`).
//! - Rewriting the profile file on disk; migration is in-memory only.
//!
//! Invariants:
//! - When both a legacy and a canonical key are present, the canonical value wins
//!   and the legacy key is still removed and still reported.
//! - Legacy keys may be nested (`filter: {fg1_name: ..}`) or flat (`filter.fg1_name: ..`).
//! - Never fails; malformed shapes are skipped with a warning.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// One legacy key that was rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationNotice {
    pub from: &'static str,
    pub to: &'static str,
}

struct LegacyKey {
    from: &'static str,
    to: &'static str,
}

const LEGACY_KEYS: &[LegacyKey] = &[
    LegacyKey {
        from: "filter.fg1_name",
        to: "query.filter_fg1_name",
    },
    LegacyKey {
        from: "connection.timeout",
        to: "query.timeout",
    },
    LegacyKey {
        from: "export.streaming",
        to: "xlsx.streaming",
    },
    LegacyKey {
        from: "export.min_format",
        to: "xlsx.min_format",
    },
];

fn halves(path: &'static str) -> (&'static str, &'static str) {
    path.split_once('.').unwrap_or((path, ""))
}

/// Removes `section.key` from its nested section, dropping the section if it empties.
fn take_nested(root: &mut Mapping, section: &str, key: &str) -> Option<Value> {
    let table = root.get_mut(section)?.as_mapping_mut()?;
    let value = table.remove(key)?;
    if table.is_empty() {
        root.remove(section);
    }
    Some(value)
}

/// Rewrites every legacy key in `root` and returns one notice per migrated key.
pub(crate) fn migrate_legacy_keys(root: &mut Mapping, profile: &str) -> Vec<MigrationNotice> {
    let mut notices = Vec::new();

    for rule in LEGACY_KEYS {
        let (from_section, from_key) = halves(rule.from);
        let nested = take_nested(root, from_section, from_key);
        let flat = root.remove(rule.from);
        let Some(legacy) = nested.or(flat) else {
            continue;
        };

        tracing::warn!(
            profile,
            from = rule.from,
            to = rule.to,
            "Deprecated profile key; migrated to its canonical path"
        );
        notices.push(MigrationNotice {
            from: rule.from,
            to: rule.to,
        });

        let (to_section, to_key) = halves(rule.to);
        let target = root
            .entry(Value::String(to_section.to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        let Some(target) = target.as_mapping_mut() else {
            tracing::warn!(
                profile,
                section = to_section,
                "Canonical section is not a mapping; dropping legacy value"
            );
            continue;
        };

        if target.contains_key(to_key) {
            tracing::debug!(
                profile,
                key = rule.to,
                "Canonical key already set; ignoring legacy value"
            );
        } else {
            target.insert(Value::String(to_key.to_string()), legacy);
        }
    }

    notices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::capture_warn_messages;

    fn mapping(text: &str) -> Mapping {
        serde_yaml::from_str(text).unwrap()
    }

    fn get<'a>(root: &'a Mapping, section: &str, key: &str) -> Option<&'a Value> {
        root.get(section)?.as_mapping()?.get(key)
    }

    #[test]
    fn test_nested_legacy_keys_move_to_canonical_paths() {
        let mut root = mapping(
            "filter:\n  fg1_name: Electronics\nconnection:\n  timeout: 60\nexport:\n  format: both\n  streaming: true\n  min_format: false\n",
        );

        let notices = migrate_legacy_keys(&mut root, "monthly");

        assert_eq!(notices.len(), 4);
        assert_eq!(
            get(&root, "query", "filter_fg1_name"),
            Some(&Value::String("Electronics".to_string()))
        );
        assert_eq!(get(&root, "query", "timeout"), Some(&Value::from(60)));
        assert_eq!(get(&root, "xlsx", "streaming"), Some(&Value::Bool(true)));
        assert_eq!(get(&root, "xlsx", "min_format"), Some(&Value::Bool(false)));
        // Emptied legacy sections are dropped; sections with canonical keys stay.
        assert!(!root.contains_key("filter"));
        assert!(!root.contains_key("connection"));
        assert_eq!(
            get(&root, "export", "format"),
            Some(&Value::String("both".to_string()))
        );
        assert_eq!(get(&root, "export", "streaming"), None);
    }

    #[test]
    fn test_flat_dotted_legacy_key() {
        let mut root = mapping("\"connection.timeout\": 15\n");
        let notices = migrate_legacy_keys(&mut root, "flat");
        assert_eq!(
            notices,
            vec![MigrationNotice {
                from: "connection.timeout",
                to: "query.timeout"
            }]
        );
        assert_eq!(get(&root, "query", "timeout"), Some(&Value::from(15)));
        assert!(!root.contains_key("connection.timeout"));
    }

    #[test]
    fn test_canonical_value_wins_but_legacy_is_reported() {
        let mut root = mapping("connection:\n  timeout: 60\nquery:\n  timeout: 5\n");
        let notices = migrate_legacy_keys(&mut root, "both");
        assert_eq!(notices.len(), 1);
        assert_eq!(get(&root, "query", "timeout"), Some(&Value::from(5)));
        assert!(!root.contains_key("connection"));
    }

    #[test]
    fn test_one_notice_when_nested_and_flat_forms_coexist() {
        let mut root = mapping("filter:\n  fg1_name: A\n\"filter.fg1_name\": B\n");
        let notices = migrate_legacy_keys(&mut root, "dup");
        assert_eq!(notices.len(), 1);
        assert!(!root.contains_key("filter.fg1_name"));
        assert_eq!(
            get(&root, "query", "filter_fg1_name"),
            Some(&Value::String("A".to_string()))
        );
    }

    #[test]
    fn test_no_legacy_keys_is_a_noop() {
        let mut root = mapping("query:\n  timeout: 5\n");
        let before = root.clone();
        assert!(migrate_legacy_keys(&mut root, "clean").is_empty());
        assert_eq!(root, before);
    }

    #[test]
    fn test_each_migration_logs_one_warning() {
        let mut root = mapping("connection:\n  timeout: 60\nexport:\n  streaming: true\n");
        let messages = capture_warn_messages(|| {
            migrate_legacy_keys(&mut root, "weekly");
        });
        let migrated = messages
            .iter()
            .filter(|m| m.contains("Deprecated profile key"))
            .count();
        assert_eq!(migrated, 2, "got: {messages:?}");
    }
}
