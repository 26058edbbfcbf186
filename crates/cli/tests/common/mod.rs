//! Shared test utilities for olap-export integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Run every command in a throwaway working directory so the default
//!   `config.yaml`, `profiles/`, and `.credentials` paths point nowhere real.
//!
//! Invariants / Assumptions:
//! - No configuration environment key from the host reaches the child process.

use assert_cmd::Command;
use olap_config::fields;
use tempfile::TempDir;

/// Returns a hermetic `olap-export` command running inside `dir`.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Every configuration environment key (current and legacy) is cleared.
/// - `RUST_LOG` is cleared so the default `warn` filter applies.
pub fn olap_cmd(dir: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("olap-export");
    cmd.current_dir(dir.path());
    cmd.env("DOTENV_DISABLED", "1");
    clear_config_env(&mut cmd);
    cmd
}

/// Removes every environment key the resolver reads.
pub fn clear_config_env(cmd: &mut Command) {
    for field in fields::ALL {
        if let Some(env) = &field.env {
            cmd.env_remove(env.name);
        }
    }
    cmd.env_remove("RUST_LOG");
}

/// Parses stdout of a successful `--output json` run.
#[allow(dead_code)]
pub fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
