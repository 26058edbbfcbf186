//! AES-256-GCM sealing and Argon2id key derivation.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use rand::RngExt;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use super::fingerprint::MachineFingerprint;

/// Errors that can occur during encryption operations.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication tag mismatch: wrong key, wrong associated data, or tampered bytes.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
}

pub type Result<T> = std::result::Result<T, EncryptionError>;

/// Core cryptographic logic for AES-256-GCM.
pub struct Encryptor;

impl Encryptor {
    /// Encrypts data using AES-256-GCM, binding `aad` into the tag.
    /// Returns (ciphertext + tag, nonce).
    pub fn encrypt(data: &[u8], key: &[u8; 32], aad: &[u8]) -> Result<(Vec<u8>, [u8; 12])> {
        let cipher = Aes256Gcm::new(key.into());
        let mut nonce_bytes = [0u8; 12];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, Payload { msg: data, aad })
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        Ok((ciphertext, nonce_bytes))
    }

    /// Decrypts data using AES-256-GCM.
    pub fn decrypt(
        ciphertext: &[u8],
        key: &[u8; 32],
        nonce: &[u8; 12],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(key.into());
        let nonce = Nonce::from_slice(nonce);

        cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| EncryptionError::DecryptionFailed)
    }

    /// Derives a 32-byte key from secret material and salt using Argon2id.
    pub fn derive_key(secret: &[u8], salt: &[u8]) -> Result<[u8; 32]> {
        let argon2 = Argon2::default();
        let mut key = [0u8; 32];
        argon2
            .hash_password_into(secret, salt, &mut key)
            .map_err(|e| EncryptionError::KeyDerivationFailed(e.to_string()))?;
        Ok(key)
    }

    /// Generates a random 16-byte salt for key derivation.
    pub fn generate_salt() -> [u8; 16] {
        let mut salt = [0u8; 16];
        rand::rng().fill(&mut salt);
        salt
    }
}

/// Derives the credential key from the machine fingerprint and, when set, the master password.
///
/// The password is appended after a NUL separator so that "fingerprint only"
/// and "fingerprint + empty password" never collide with longer inputs.
pub fn derive_key(
    fingerprint: &MachineFingerprint,
    passphrase: Option<&SecretString>,
    salt: &[u8],
) -> Result<[u8; 32]> {
    let mut material = fingerprint.as_str().as_bytes().to_vec();
    if let Some(passphrase) = passphrase {
        material.push(0);
        material.extend_from_slice(passphrase.expose_secret().as_bytes());
    }
    let key = Encryptor::derive_key(&material, salt);
    material.fill(0);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::IdentityFacts;

    fn fingerprint(host: &str) -> MachineFingerprint {
        MachineFingerprint::from_facts(&IdentityFacts {
            hostname: host.to_string(),
            account: "analyst".to_string(),
            volume_id: "1234-ABCD".to_string(),
        })
    }

    #[test]
    fn test_encryption_roundtrip() {
        let key = [42u8; 32];
        let data = b"sensitive data";

        let (ciphertext, nonce) = Encryptor::encrypt(data, &key, b"aad").unwrap();
        let decrypted = Encryptor::decrypt(&ciphertext, &key, &nonce, b"aad").unwrap();

        assert_eq!(data, decrypted.as_slice());
    }

    #[test]
    fn test_associated_data_is_authenticated() {
        let key = [7u8; 32];
        let (ciphertext, nonce) = Encryptor::encrypt(b"secret", &key, b"CORP|alice").unwrap();
        let err = Encryptor::decrypt(&ciphertext, &key, &nonce, b"CORP|mallory").unwrap_err();
        assert!(matches!(err, EncryptionError::DecryptionFailed));
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let key = [1u8; 32];
        let (c1, n1) = Encryptor::encrypt(b"same", &key, b"").unwrap();
        let (c2, n2) = Encryptor::encrypt(b"same", &key, b"").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_key_derivation() {
        let salt = Encryptor::generate_salt();

        let key1 = Encryptor::derive_key(b"password", &salt).unwrap();
        let key2 = Encryptor::derive_key(b"password", &salt).unwrap();
        assert_eq!(key1, key2);

        let salt2 = Encryptor::generate_salt();
        let key3 = Encryptor::derive_key(b"password", &salt2).unwrap();
        assert_ne!(key1, key3);
    }

    #[test]
    fn test_credential_key_depends_on_fingerprint_and_passphrase() {
        let salt = [9u8; 16];
        let here = fingerprint("WS-01");
        let there = fingerprint("WS-02");
        let master = SecretString::new("hunter2".to_string().into());

        let plain = derive_key(&here, None, &salt).unwrap();
        assert_eq!(plain, derive_key(&here, None, &salt).unwrap());
        assert_ne!(plain, derive_key(&there, None, &salt).unwrap());

        let guarded = derive_key(&here, Some(&master), &salt).unwrap();
        assert_ne!(plain, guarded);

        let empty = SecretString::new(String::new().into());
        assert_ne!(plain, derive_key(&here, Some(&empty), &salt).unwrap());
    }
}
