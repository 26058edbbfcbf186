//! Tests for configuration resolution.
//!
//! Responsibilities:
//! - Test per-field priority across CLI, profile, environment, settings file, and defaults.
//! - Test validation failures and the cross-field rules applied by `resolve`.
//! - Test deprecated environment and profile key reporting.
//! - Test the builder against profiles and settings on disk.
//!
//! Does NOT handle:
//! - Coercion of individual scalar types (tested in fields.rs).
//! - Period section parsing details (tested in period.rs).
//!
//! Invariants:
//! - Tests that touch process environment or the working directory use
//!   `serial_test` and `env_lock()`.
//! - Most tests pass an explicit `EnvMap` and never read process environment.

use std::sync::Mutex;

use serde_yaml::Mapping;

use crate::persistence::RawProfile;

pub mod profile_tests;

/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// Builds an in-memory profile from YAML text.
pub fn profile(name: &str, yaml: &str) -> RawProfile {
    let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
    RawProfile::from_mapping(name, mapping)
}
