//! Machine and account fingerprint used to bind credentials to one host.
//!
//! The fingerprint is a SHA-256 digest over the host name, the account name,
//! and a storage volume identifier. It is not secret, but it is stable across
//! runs on the same machine and account.

use std::fmt;
use std::process::Command;
use std::sync::OnceLock;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::loader::env_var_or_none;

/// Errors collecting machine identity.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Could not determine the host name")]
    Hostname,

    #[error("Could not determine the account name")]
    Account,

    #[error("Could not determine a storage volume identifier: {0}")]
    Volume(String),
}

/// Raw identity inputs that feed the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFacts {
    pub hostname: String,
    pub account: String,
    pub volume_id: String,
}

impl IdentityFacts {
    /// Collects identity facts for the running process.
    pub fn collect() -> Result<Self, FingerprintError> {
        let hostname = hostname().ok_or(FingerprintError::Hostname)?;
        let account = ["USER", "USERNAME", "LOGNAME"]
            .into_iter()
            .find_map(env_var_or_none)
            .ok_or(FingerprintError::Account)?;
        let volume_id = volume_id()?;
        Ok(Self {
            hostname,
            account,
            volume_id,
        })
    }
}

/// Stable digest of [`IdentityFacts`], hex encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct MachineFingerprint(String);

impl MachineFingerprint {
    pub fn from_facts(facts: &IdentityFacts) -> Self {
        let mut hasher = Sha256::new();
        for part in [&facts.hostname, &facts.account, &facts.volume_id] {
            hasher.update(part.as_bytes());
            hasher.update([0x1f]);
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint of this machine, computed once per process.
    pub fn current() -> Result<Self, FingerprintError> {
        static CURRENT: OnceLock<MachineFingerprint> = OnceLock::new();
        if let Some(fp) = CURRENT.get() {
            return Ok(fp.clone());
        }
        let fp = Self::from_facts(&IdentityFacts::collect()?);
        tracing::debug!(fingerprint = %fp, "Computed machine fingerprint");
        Ok(CURRENT.get_or_init(|| fp).clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineFingerprint {
    /// Short form for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0[..self.0.len().min(12)])
    }
}

impl fmt::Debug for MachineFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MachineFingerprint({self})")
    }
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
fn first_non_empty_file(paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|p| {
        let text = std::fs::read_to_string(p).ok()?;
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn hostname() -> Option<String> {
    #[cfg(target_os = "linux")]
    if let Some(name) = first_non_empty_file(&["/proc/sys/kernel/hostname", "/etc/hostname"]) {
        return Some(name);
    }
    ["COMPUTERNAME", "HOSTNAME"]
        .into_iter()
        .find_map(env_var_or_none)
        .or_else(|| {
            command_stdout("hostname", &[])
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

#[cfg(all(unix, not(target_os = "macos")))]
fn volume_id() -> Result<String, FingerprintError> {
    first_non_empty_file(&["/etc/machine-id", "/var/lib/dbus/machine-id"])
        .ok_or_else(|| FingerprintError::Volume("no machine-id file".to_string()))
}

#[cfg(target_os = "macos")]
fn volume_id() -> Result<String, FingerprintError> {
    command_stdout("ioreg", &["-rd1", "-c", "IOPlatformExpertDevice"])
        .as_deref()
        .and_then(parse_ioreg_uuid)
        .ok_or_else(|| FingerprintError::Volume("IOPlatformUUID not reported".to_string()))
}

#[cfg(windows)]
fn volume_id() -> Result<String, FingerprintError> {
    let drive = env_var_or_none("SystemDrive").unwrap_or_else(|| "C:".to_string());
    command_stdout("cmd", &["/C", "vol", &drive])
        .as_deref()
        .and_then(parse_vol_serial)
        .ok_or_else(|| FingerprintError::Volume(format!("no serial number for {drive}")))
}

#[cfg(not(any(unix, windows)))]
fn volume_id() -> Result<String, FingerprintError> {
    Err(FingerprintError::Volume("unsupported platform".to_string()))
}

/// Extracts the value of `"IOPlatformUUID" = "..."` from `ioreg` output.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_ioreg_uuid(text: &str) -> Option<String> {
    let line = text.lines().find(|l| l.contains("IOPlatformUUID"))?;
    let (_, value) = line.split_once('=')?;
    let value = value.trim().trim_matches('"');
    (!value.is_empty()).then(|| value.to_string())
}

/// Extracts the `XXXX-XXXX` serial from `vol` output (last token of the last non-empty line).
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_vol_serial(text: &str) -> Option<String> {
    let line = text.lines().rev().find(|l| !l.trim().is_empty())?;
    let token = line.split_whitespace().last()?;
    (token.len() == 9 && token.as_bytes()[4] == b'-').then(|| token.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> IdentityFacts {
        IdentityFacts {
            hostname: "WS-01".to_string(),
            account: "analyst".to_string(),
            volume_id: "1234-ABCD".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = MachineFingerprint::from_facts(&facts());
        let b = MachineFingerprint::from_facts(&facts());
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_each_fact_changes_the_fingerprint() {
        let base = MachineFingerprint::from_facts(&facts());

        let mut other = facts();
        other.hostname = "WS-02".to_string();
        assert_ne!(base, MachineFingerprint::from_facts(&other));

        let mut other = facts();
        other.account = "auditor".to_string();
        assert_ne!(base, MachineFingerprint::from_facts(&other));

        let mut other = facts();
        other.volume_id = "9999-0000".to_string();
        assert_ne!(base, MachineFingerprint::from_facts(&other));
    }

    #[test]
    fn test_field_boundaries_are_separated() {
        let joined = IdentityFacts {
            hostname: "ab".to_string(),
            account: "c".to_string(),
            volume_id: "d".to_string(),
        };
        let shifted = IdentityFacts {
            hostname: "a".to_string(),
            account: "bc".to_string(),
            volume_id: "d".to_string(),
        };
        assert_ne!(
            MachineFingerprint::from_facts(&joined),
            MachineFingerprint::from_facts(&shifted)
        );
    }

    #[test]
    fn test_debug_shows_short_form_only() {
        let fp = MachineFingerprint::from_facts(&facts());
        let debug = format!("{fp:?}");
        assert!(!debug.contains(fp.as_str()));
        assert!(debug.contains(&fp.as_str()[..12]));
    }

    #[test]
    fn test_parse_ioreg_uuid() {
        let text = r#"+-o MacBookPro  <class IOPlatformExpertDevice>
    {
      "IOPlatformSerialNumber" = "C02XYZ"
      "IOPlatformUUID" = "0A1B2C3D-1111-2222-3333-444455556666"
    }"#;
        assert_eq!(
            parse_ioreg_uuid(text).as_deref(),
            Some("0A1B2C3D-1111-2222-3333-444455556666")
        );
        assert_eq!(parse_ioreg_uuid("nothing here"), None);
    }

    #[test]
    fn test_parse_vol_serial() {
        let text = " Volume in drive C has no label.\r\n Volume Serial Number is 5e2a-91f0\r\n";
        assert_eq!(parse_vol_serial(text).as_deref(), Some("5E2A-91F0"));
        assert_eq!(parse_vol_serial("The device is not ready."), None);
    }
}
