//! Script repository for JSON storage
//!
//! Manages loading and saving script records to scripts.json. The repository
//! has no crypto awareness: the `content` field of a stored record is an
//! opaque blob string handed to it by the session layer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::models::{DisplaySettings, ScriptId};

use super::file_io::{read_json, write_json_atomic};

/// A script record as persisted on disk
///
/// `content` is always the ciphertext blob of the most recent write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredScript {
    pub id: ScriptId,
    pub title: String,
    /// Opaque ciphertext blob (base64 nonce || ciphertext || tag)
    pub content: String,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Serializable script file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScriptData {
    scripts: Vec<StoredScript>,
}

/// Repository for script persistence
pub struct ScriptRepository {
    path: PathBuf,
    data: RwLock<HashMap<ScriptId, StoredScript>>,
}

impl ScriptRepository {
    /// Create a new script repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load scripts from disk
    pub fn load(&self) -> Result<(), VaultError> {
        let file_data: ScriptData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for script in file_data.scripts {
            data.insert(script.id, script);
        }

        Ok(())
    }

    /// Save scripts to disk atomically
    pub fn save(&self) -> Result<(), VaultError> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut scripts: Vec<_> = data.values().cloned().collect();
        scripts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let file_data = ScriptData { scripts };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a script record by ID
    pub fn get(&self, id: ScriptId) -> Result<Option<StoredScript>, VaultError> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all script records, newest `updated_at` first
    pub fn get_all(&self) -> Result<Vec<StoredScript>, VaultError> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut scripts: Vec<_> = data.values().cloned().collect();
        scripts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(scripts)
    }

    /// Insert or update a script record
    pub fn upsert(&self, script: StoredScript) -> Result<(), VaultError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(script.id, script);
        Ok(())
    }

    /// Delete a script record; returns whether it existed
    pub fn delete(&self, id: ScriptId) -> Result<bool, VaultError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count script records
    pub fn count(&self) -> Result<usize, VaultError> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ScriptRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scripts.json");
        let repo = ScriptRepository::new(path);
        (temp_dir, repo)
    }

    fn stored(title: &str, updated_ms: i64) -> StoredScript {
        StoredScript {
            id: ScriptId::new(),
            title: title.to_string(),
            content: "b2xkIGJsb2I=".to_string(),
            display: DisplaySettings::default(),
            created_at: DateTime::from_timestamp_millis(updated_ms).unwrap(),
            updated_at: DateTime::from_timestamp_millis(updated_ms).unwrap(),
        }
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let script = stored("Morning show", 1_700_000_000_000);
        let id = script.id;
        repo.upsert(script).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.title, "Morning show");
    }

    #[test]
    fn test_get_all_orders_by_updated_desc() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(stored("older", 1_700_000_000_000)).unwrap();
        repo.upsert(stored("newest", 1_700_000_002_000)).unwrap();
        repo.upsert(stored("middle", 1_700_000_001_000)).unwrap();

        let all = repo.get_all().unwrap();
        let titles: Vec<_> = all.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["newest", "middle", "older"]);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let script = stored("persisted", 1_700_000_000_000);
        let id = script.id;
        repo.upsert(script).unwrap();
        repo.save().unwrap();

        let repo2 = ScriptRepository::new(temp_dir.path().join("scripts.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.count().unwrap(), 1);
        let retrieved = repo2.get(id).unwrap().unwrap();
        assert_eq!(retrieved.title, "persisted");
        assert_eq!(retrieved.content, "b2xkIGJsb2I=");
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let script = stored("doomed", 1_700_000_000_000);
        let id = script.id;
        repo.upsert(script).unwrap();

        assert!(repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
        // Second delete reports absence without error
        assert!(!repo.delete(id).unwrap());
    }
}
