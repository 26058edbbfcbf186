//! On-disk profile storage.
//!
//! Responsibilities:
//! - Read, list, write, and delete named YAML profiles.
//! - Rewrite legacy profile key paths to their canonical locations.
//! - Provide the atomic write primitive shared with the credential vault.
//!
//! Does NOT handle:
//! - Turning profile values into typed settings (see `loader`).
//!
//! Invariants:
//! - Writes are atomic: a sibling temp file is written, synced, then renamed over the target.
//! - Private writes create a fresh temp file that is owner-only (0600 on Unix,
//!   restricted ACL on Windows) before any byte is written.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

mod migration;
mod profiles;

pub use migration::MigrationNotice;
pub use profiles::{ProfileError, ProfileStore, ProfileSummary, RawProfile};

/// `<file name>.tmp` next to `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Creates `temp_path` (failing if it exists) and writes `contents` into it.
///
/// A private file is owner-only before the first byte lands: mode 0600 at
/// creation on Unix, a restricted ACL on Windows.
fn write_temp(temp_path: &Path, contents: &[u8], private: bool) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    #[cfg(not(any(unix, windows)))]
    let _ = private;

    let mut file = options.open(temp_path)?;
    #[cfg(windows)]
    if private {
        restrict_windows_acl(temp_path);
    }
    file.write_all(contents)?;
    file.sync_all()
}

/// Atomically replaces `path` with `contents`.
///
/// With `private` set, the file is readable by the owning account only.
pub(crate) fn write_atomic(path: &Path, contents: &[u8], private: bool) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = temp_sibling(path);
    match std::fs::remove_file(&temp_path) {
        Ok(()) => tracing::debug!(path = %temp_path.display(), "Removed stale temp file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Err(e) = write_temp(&temp_path, contents, private) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    tracing::debug!(path = %path.display(), private, "File saved atomically");
    Ok(())
}

/// Best-effort: strip inherited ACL entries and grant only the current user.
#[cfg(windows)]
fn restrict_windows_acl(path: &Path) {
    let Some(user) = crate::loader::env_var_or_none("USERNAME") else {
        tracing::warn!(path = %path.display(), "USERNAME not set; file ACL left unchanged");
        return;
    };
    let status = std::process::Command::new("icacls")
        .arg(path)
        .args(["/inheritance:r", "/grant:r"])
        .arg(format!("{user}:F"))
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();
    match status {
        Ok(s) if s.success() => {}
        Ok(s) => tracing::warn!(path = %path.display(), code = ?s.code(), "icacls failed"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not run icacls"),
    }
}
