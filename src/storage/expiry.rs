//! Session-expiry slot
//!
//! A single epoch-millisecond timestamp kept in its own small file outside
//! the data store. Rewritten on unlock and on every focus-gain event, read by
//! the periodic expiry check, removed on lock.

use std::fs;
use std::path::PathBuf;

use crate::error::VaultError;

/// Lightweight persistence for the session-expiry timestamp
pub struct ExpirySlot {
    path: PathBuf,
}

impl ExpirySlot {
    /// Create a slot backed by the given file path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the expiry timestamp, if one is set
    ///
    /// A missing or unparseable slot reads as `None`; the lifecycle treats
    /// that as already expired for a live session.
    pub fn read(&self) -> Option<i64> {
        let contents = fs::read_to_string(&self.path).ok()?;
        contents.trim().parse::<i64>().ok()
    }

    /// Write the expiry timestamp (epoch milliseconds)
    pub fn write(&self, epoch_ms: i64) -> Result<(), VaultError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| VaultError::Io(format!("Failed to create directory: {}", e)))?;
        }
        fs::write(&self.path, epoch_ms.to_string())
            .map_err(|e| VaultError::Io(format!("Failed to write expiry slot: {}", e)))
    }

    /// Remove the slot; clearing an absent slot is not an error
    pub fn clear(&self) -> Result<(), VaultError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Io(format!("Failed to clear expiry slot: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_slot_reads_none() {
        let temp_dir = TempDir::new().unwrap();
        let slot = ExpirySlot::new(temp_dir.path().join("session_expiry"));
        assert_eq!(slot.read(), None);
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let slot = ExpirySlot::new(temp_dir.path().join("session_expiry"));

        slot.write(1_700_000_000_000).unwrap();
        assert_eq!(slot.read(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_rewrite_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let slot = ExpirySlot::new(temp_dir.path().join("session_expiry"));

        slot.write(1_700_000_000_000).unwrap();
        slot.write(1_700_000_999_999).unwrap();
        assert_eq!(slot.read(), Some(1_700_000_999_999));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let slot = ExpirySlot::new(temp_dir.path().join("session_expiry"));

        slot.write(1_700_000_000_000).unwrap();
        slot.clear().unwrap();
        assert_eq!(slot.read(), None);
        slot.clear().unwrap();
    }

    #[test]
    fn test_garbage_slot_reads_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session_expiry");
        std::fs::write(&path, "not a number").unwrap();

        let slot = ExpirySlot::new(path);
        assert_eq!(slot.read(), None);
    }
}
