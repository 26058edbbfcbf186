//! Encrypted credential file.
//!
//! On-disk layout is a small JSON document. Only the password is encrypted;
//! domain and username are stored in the clear and bound to the ciphertext as
//! associated data, so editing either one invalidates the file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::encryption::{EncryptionError, Encryptor, derive_key};
use super::fingerprint::{FingerprintError, MachineFingerprint};
use crate::constants::{CREDENTIAL_FILE_VERSION, CREDENTIAL_KDF};
use crate::persistence::write_atomic;

/// Why a credential file could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptFailure {
    /// No file at the path.
    Missing,
    /// Not a credential file this version understands.
    Malformed(String),
    /// Wrong machine, wrong account, wrong master password, or modified contents.
    KeyMismatch,
}

/// Errors that can occur while saving or loading credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Cannot decrypt credentials at {path}: {}", describe(.reason))]
    Decrypt {
        path: PathBuf,
        reason: DecryptFailure,
    },

    #[error("Failed to encrypt credentials: {0}")]
    Encrypt(#[from] EncryptionError),

    #[error("Failed to access credential file at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize credentials: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

fn describe(reason: &DecryptFailure) -> String {
    match reason {
        DecryptFailure::Missing => "file not found".to_string(),
        DecryptFailure::Malformed(detail) => format!("file is malformed ({detail})"),
        DecryptFailure::KeyMismatch => {
            "saved on another machine or account, wrong master password, or file modified"
                .to_string()
        }
    }
}

impl CredentialError {
    /// True when the file simply does not exist yet.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::Decrypt {
                reason: DecryptFailure::Missing,
                ..
            }
        )
    }
}

/// Decrypted LOGIN credentials.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub domain: String,
    pub username: String,
    pub password: SecretString,
}

impl CredentialRecord {
    pub fn new(
        domain: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    version: u32,
    kdf: String,
    domain: String,
    username: String,
    salt: String,
    nonce: String,
    ciphertext: String,
}

fn associated_data(version: u32, domain: &str, username: &str) -> Vec<u8> {
    format!("{version}\u{1f}{domain}\u{1f}{username}").into_bytes()
}

/// Saves and loads a [`CredentialRecord`] bound to one machine fingerprint.
#[derive(Debug, Clone)]
pub struct CredentialVault {
    fingerprint: MachineFingerprint,
    passphrase: Option<SecretString>,
}

impl CredentialVault {
    pub fn new(fingerprint: MachineFingerprint) -> Self {
        Self {
            fingerprint,
            passphrase: None,
        }
    }

    /// Vault keyed to the running machine and account.
    pub fn for_this_machine() -> Result<Self, CredentialError> {
        Ok(Self::new(MachineFingerprint::current()?))
    }

    /// Mixes a master password into the key.
    pub fn with_passphrase(mut self, passphrase: SecretString) -> Self {
        self.passphrase = Some(passphrase);
        self
    }

    pub fn has_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Encrypts `record` and atomically replaces the file at `path`.
    pub fn save(&self, path: &Path, record: &CredentialRecord) -> Result<(), CredentialError> {
        let salt = Encryptor::generate_salt();
        let key = derive_key(&self.fingerprint, self.passphrase.as_ref(), &salt)?;
        let aad = associated_data(CREDENTIAL_FILE_VERSION, &record.domain, &record.username);
        let (ciphertext, nonce) =
            Encryptor::encrypt(record.password.expose_secret().as_bytes(), &key, &aad)?;

        let stored = StoredCredentials {
            version: CREDENTIAL_FILE_VERSION,
            kdf: CREDENTIAL_KDF.to_string(),
            domain: record.domain.clone(),
            username: record.username.clone(),
            salt: hex::encode(salt),
            nonce: hex::encode(nonce),
            ciphertext: hex::encode(ciphertext),
        };
        let json = serde_json::to_vec_pretty(&stored)?;

        write_atomic(path, &json, true).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            domain = %record.domain,
            username = %record.username,
            master_password = self.has_passphrase(),
            "Credentials saved"
        );
        Ok(())
    }

    /// Reads and decrypts the file at `path`.
    pub fn load(&self, path: &Path) -> Result<CredentialRecord, CredentialError> {
        let fail = |reason: DecryptFailure| CredentialError::Decrypt {
            path: path.to_path_buf(),
            reason,
        };
        let malformed = |detail: &str| fail(DecryptFailure::Malformed(detail.to_string()));

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(fail(DecryptFailure::Missing)),
            Err(source) => {
                return Err(CredentialError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let stored: StoredCredentials =
            serde_json::from_slice(&bytes).map_err(|e| malformed(&e.to_string()))?;
        if stored.version != CREDENTIAL_FILE_VERSION {
            return Err(malformed(&format!("unsupported version {}", stored.version)));
        }
        if stored.kdf != CREDENTIAL_KDF {
            return Err(malformed(&format!("unsupported kdf {}", stored.kdf)));
        }

        let salt = hex::decode(&stored.salt).map_err(|_| malformed("salt is not hex"))?;
        let nonce: [u8; 12] = hex::decode(&stored.nonce)
            .ok()
            .and_then(|n| n.try_into().ok())
            .ok_or_else(|| malformed("nonce must be 12 hex-encoded bytes"))?;
        let ciphertext =
            hex::decode(&stored.ciphertext).map_err(|_| malformed("ciphertext is not hex"))?;

        let key = derive_key(&self.fingerprint, self.passphrase.as_ref(), &salt)
            .map_err(|e| malformed(&e.to_string()))?;
        let aad = associated_data(stored.version, &stored.domain, &stored.username);
        let plaintext = Encryptor::decrypt(&ciphertext, &key, &nonce, &aad).map_err(|_| {
            tracing::warn!(path = %path.display(), "Credential decryption failed");
            fail(DecryptFailure::KeyMismatch)
        })?;
        let password =
            String::from_utf8(plaintext).map_err(|_| malformed("password is not UTF-8"))?;

        tracing::debug!(path = %path.display(), username = %stored.username, "Credentials loaded");
        Ok(CredentialRecord {
            domain: stored.domain,
            username: stored.username,
            password: SecretString::new(password.into()),
        })
    }

    /// Removes the credential file. Returns whether a file was removed.
    pub fn delete(path: &Path) -> Result<bool, CredentialError> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Credentials deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CredentialError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }
}
