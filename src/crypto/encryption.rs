//! AES-256-GCM encryption/decryption
//!
//! Provides authenticated encryption for script content at rest. Each
//! encryption operation generates a unique nonce; the stored blob is
//! base64(nonce || ciphertext || tag).

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

use super::DerivedKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

/// An encrypted content blob as persisted in the store
///
/// A single base64 string encoding nonce || ciphertext || tag. The storage
/// layer treats this as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBlob {
    encoded: String,
}

impl EncryptedBlob {
    /// Build a blob from the raw nonce and ciphertext (tag included)
    fn new(nonce: &[u8], ciphertext: &[u8]) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let mut raw = Vec::with_capacity(nonce.len() + ciphertext.len());
        raw.extend_from_slice(nonce);
        raw.extend_from_slice(ciphertext);
        Self {
            encoded: STANDARD.encode(raw),
        }
    }

    /// Wrap an already-encoded blob loaded from storage
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self {
            encoded: encoded.into(),
        }
    }

    /// The base64 form as stored on disk
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Decode into (nonce, ciphertext) parts
    fn decode(&self) -> VaultResult<(Vec<u8>, Vec<u8>)> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let raw = STANDARD
            .decode(&self.encoded)
            .map_err(|e| VaultError::Authentication(format!("Invalid blob encoding: {}", e)))?;

        // A valid blob carries at least a nonce and a tag
        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(VaultError::Authentication(format!(
                "Blob truncated: {} bytes",
                raw.len()
            )));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
        Ok((nonce.to_vec(), ciphertext.to_vec()))
    }
}

/// Encrypt UTF-8 plaintext using AES-256-GCM
///
/// Generates a fresh random nonce for every call, including repeated
/// encryption of identical content.
pub fn encrypt_string(plaintext: &str, key: &DerivedKey) -> VaultResult<EncryptedBlob> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedBlob::new(&nonce_bytes, &ciphertext))
}

/// Decrypt a blob back to UTF-8 plaintext
///
/// Fails with an authentication error when the tag does not verify (wrong
/// key, tampered or truncated blob). Never returns partial plaintext.
pub fn decrypt_string(blob: &EncryptedBlob, key: &DerivedKey) -> VaultResult<String> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let (nonce_bytes, ciphertext) = blob.decode()?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| VaultError::Authentication("Ciphertext failed to authenticate".into()))?;

    String::from_utf8(plaintext)
        .map_err(|e| VaultError::Encryption(format!("Invalid UTF-8 in decrypted data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::{derive_key, KeySalt};

    fn test_key() -> DerivedKey {
        let salt = KeySalt::generate();
        derive_key("test_passphrase", &salt).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = test_key();
        let plaintext = "Ladies and gentlemen, welcome to the evening news.";

        let encrypted = encrypt_string(plaintext, &key).unwrap();
        let decrypted = decrypt_string(&encrypted, &key).unwrap();

        assert_eq!(plaintext, decrypted);
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let key = test_key();
        let plaintext = "same content";

        let encrypted1 = encrypt_string(plaintext, &key).unwrap();
        let encrypted2 = encrypt_string(plaintext, &key).unwrap();

        // Same plaintext must never produce the same blob (fresh nonce)
        assert_ne!(encrypted1.as_str(), encrypted2.as_str());
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = test_key();
        let salt = KeySalt::generate();
        let key2 = derive_key("different_passphrase", &salt).unwrap();

        let encrypted = encrypt_string("secret script", &key1).unwrap();

        let result = decrypt_string(&encrypted, &key2);
        assert!(matches!(result, Err(VaultError::Authentication(_))));
    }

    #[test]
    fn test_tampered_blob_fails() {
        use base64::{engine::general_purpose::STANDARD, Engine};

        let key = test_key();
        let encrypted = encrypt_string("original content", &key).unwrap();

        // Flip one byte anywhere in the raw blob
        let raw = STANDARD.decode(encrypted.as_str()).unwrap();
        for i in 0..raw.len() {
            let mut copy = raw.clone();
            copy[i] ^= 0xFF;
            let tampered = EncryptedBlob::from_encoded(STANDARD.encode(&copy));
            let result = decrypt_string(&tampered, &key);
            assert!(
                matches!(result, Err(VaultError::Authentication(_))),
                "byte {} flip was not detected",
                i
            );
        }
    }

    #[test]
    fn test_truncated_blob_fails() {
        let key = test_key();
        let truncated = EncryptedBlob::from_encoded("c2hvcnQ=");
        let result = decrypt_string(&truncated, &key);
        assert!(matches!(result, Err(VaultError::Authentication(_))));
    }

    #[test]
    fn test_non_base64_blob_fails() {
        let key = test_key();
        let garbage = EncryptedBlob::from_encoded("!!! not base64 !!!");
        let result = decrypt_string(&garbage, &key);
        assert!(matches!(result, Err(VaultError::Authentication(_))));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key();
        let encrypted = encrypt_string("", &key).unwrap();
        let decrypted = decrypt_string(&encrypted, &key).unwrap();
        // Empty content decrypts to empty, distinct from any failure path
        assert_eq!(decrypted, "");
    }

    #[test]
    fn test_large_plaintext() {
        let key = test_key();
        let plaintext = "line of a long script\n".repeat(4_000);

        let encrypted = encrypt_string(&plaintext, &key).unwrap();
        let decrypted = decrypt_string(&encrypted, &key).unwrap();

        assert_eq!(plaintext, decrypted);
    }
}
