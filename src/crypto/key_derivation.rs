//! Key derivation using PBKDF2-HMAC-SHA512
//!
//! Derives encryption keys from user passphrases. The salt is generated once
//! per vault, persisted unencrypted, and re-used on every unlock so the same
//! passphrase always re-derives the identical key.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{VaultError, VaultResult};

/// Size of the per-vault salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of the derived key in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count. The vault format requires at least 100,000.
pub const PBKDF2_ITERATIONS: u32 = 210_000;

/// Per-vault key derivation salt
///
/// Stored base64-encoded in the vault metadata file. Salts are not secret;
/// they only bind the derived key to this vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySalt {
    encoded: String,
}

impl KeySalt {
    /// Generate a fresh random salt
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let mut bytes = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self {
            encoded: STANDARD.encode(bytes),
        }
    }

    /// Decode the salt bytes from base64
    pub fn as_bytes(&self) -> VaultResult<[u8; SALT_SIZE]> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let decoded = STANDARD
            .decode(&self.encoded)
            .map_err(|e| VaultError::VaultCorrupt(format!("Invalid salt encoding: {}", e)))?;
        decoded
            .try_into()
            .map_err(|_| VaultError::VaultCorrupt("Invalid salt length".into()))
    }

    /// The base64 form as stored on disk
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

/// A derived encryption key
///
/// Exists only in process memory for the duration of an unlocked session and
/// is zeroed when dropped. Never serialized.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

// Never print key material
impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey").finish_non_exhaustive()
    }
}

/// Derive an encryption key from a passphrase and salt
///
/// Deterministic: the same passphrase and salt always produce the same key.
pub fn derive_key(passphrase: &str, salt: &KeySalt) -> VaultResult<DerivedKey> {
    let salt_bytes = salt.as_bytes()?;

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha512>(
        passphrase.as_bytes(),
        &salt_bytes,
        PBKDF2_ITERATIONS,
        &mut key,
    );

    Ok(DerivedKey { key })
}
