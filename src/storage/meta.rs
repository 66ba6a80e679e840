//! Vault metadata repository
//!
//! Persists the settings/metadata family: the key derivation salt, the
//! passphrase validation token, and the singleton settings record. The salt
//! and token are write-once; settings are created lazily with defaults on
//! first read.

use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::crypto::KeySalt;
use crate::error::VaultError;
use crate::models::VaultSettings;

use super::file_io::{read_json, write_json_atomic};

/// Serializable metadata file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VaultMetaData {
    /// Base64 key derivation salt; generated once at first-time setup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encryption_salt: Option<KeySalt>,

    /// Ciphertext blob of the vault marker, used to verify a passphrase
    /// attempt without storing the passphrase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation_token: Option<String>,

    /// Singleton settings record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<VaultSettings>,
}

/// Repository for vault metadata persistence
pub struct MetaRepository {
    path: PathBuf,
    data: RwLock<VaultMetaData>,
}

impl MetaRepository {
    /// Create a new metadata repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(VaultMetaData::default()),
        }
    }

    /// Load metadata from disk
    pub fn load(&self) -> Result<(), VaultError> {
        let file_data: VaultMetaData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = file_data;

        Ok(())
    }

    /// Persist the current metadata atomically
    fn save(&self, data: &VaultMetaData) -> Result<(), VaultError> {
        write_json_atomic(&self.path, data)
    }

    /// Get the key derivation salt, if the vault has been set up
    pub fn salt(&self) -> Result<Option<KeySalt>, VaultError> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.encryption_salt.clone())
    }

    /// Store the salt; immutable after first-time setup
    pub fn set_salt(&self, salt: KeySalt) -> Result<(), VaultError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        data.encryption_salt = Some(salt);
        self.save(&data)
    }

    /// Store the salt and validation token together in one atomic write
    ///
    /// First-time setup must never leave a salt on disk without its token.
    pub fn initialize_vault(&self, salt: KeySalt, token: String) -> Result<(), VaultError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        data.encryption_salt = Some(salt);
        data.validation_token = Some(token);
        self.save(&data)
    }

    /// Get the validation token blob, if present
    pub fn validation_token(&self) -> Result<Option<String>, VaultError> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.validation_token.clone())
    }

    /// Store the validation token blob
    pub fn set_validation_token(&self, token: String) -> Result<(), VaultError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        data.validation_token = Some(token);
        self.save(&data)
    }

    /// Get the settings record, defaulting lazily when absent
    pub fn settings(&self) -> Result<VaultSettings, VaultError> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.settings.clone().unwrap_or_default())
    }

    /// Store the settings record
    pub fn set_settings(&self, settings: VaultSettings) -> Result<(), VaultError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        data.settings = Some(settings);
        self.save(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, MetaRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.json");
        let repo = MetaRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_fresh_vault_has_no_salt_or_token() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        assert!(repo.salt().unwrap().is_none());
        assert!(repo.validation_token().unwrap().is_none());
    }

    #[test]
    fn test_settings_default_lazily() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let settings = repo.settings().unwrap();
        assert_eq!(settings, VaultSettings::default());
    }

    #[test]
    fn test_salt_and_token_persist() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let salt = KeySalt::generate();
        repo.set_salt(salt.clone()).unwrap();
        repo.set_validation_token("dG9rZW4=".to_string()).unwrap();

        let repo2 = MetaRepository::new(temp_dir.path().join("vault.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.salt().unwrap(), Some(salt));
        assert_eq!(
            repo2.validation_token().unwrap(),
            Some("dG9rZW4=".to_string())
        );
    }

    #[test]
    fn test_settings_persist() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let mut settings = VaultSettings::default();
        settings.session_timeout_minutes = 120;
        repo.set_settings(settings.clone()).unwrap();

        let repo2 = MetaRepository::new(temp_dir.path().join("vault.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.settings().unwrap(), settings);
    }
}
