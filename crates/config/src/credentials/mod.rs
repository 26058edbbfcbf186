//! Credentials at rest for the LOGIN authentication method.
//!
//! Responsibilities:
//! - Derive a stable fingerprint of the current machine and account.
//! - Encrypt a domain/username/password record with AES-256-GCM under a key
//!   derived (Argon2id) from the fingerprint and an optional master password.
//! - Save, load, and delete the encrypted credential file.
//!
//! Does NOT handle:
//! - Prompting for passwords (the CLI owns the terminal).
//! - Deciding where the credential file lives (see `SecretsConfig::credentials_file`).
//!
//! Invariants:
//! - The password never appears in plaintext on disk or in logs.
//! - A file written on one machine/account, or under one master password,
//!   cannot be decrypted under another.
//! - The file is written atomically and is readable by the owning account only.

mod encryption;
mod fingerprint;
mod vault;

pub use encryption::{EncryptionError, Encryptor, derive_key};
pub use fingerprint::{FingerprintError, IdentityFacts, MachineFingerprint};
pub use vault::{CredentialError, CredentialRecord, CredentialVault, DecryptFailure};
