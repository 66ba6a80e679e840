//! Path management for PromptVault
//!
//! Provides XDG-compliant path resolution for the vault's on-disk layout.
//!
//! ## Path Resolution Order
//!
//! 1. `PROMPTVAULT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/promptvault` or `~/.config/promptvault`
//! 3. Windows: `%APPDATA%\promptvault`

use std::path::PathBuf;

use crate::error::VaultError;

/// Manages all paths used by PromptVault
#[derive(Debug, Clone)]
pub struct VaultPaths {
    /// Base directory for all vault data
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance
    ///
    /// Path resolution:
    /// 1. `PROMPTVAULT_DATA_DIR` env var (explicit override)
    /// 2. Unix: `$XDG_CONFIG_HOME/promptvault` or `~/.config/promptvault`
    /// 3. Windows: `%APPDATA%\promptvault`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, VaultError> {
        let base_dir = if let Ok(custom) = std::env::var("PROMPTVAULT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/promptvault/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/promptvault/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to scripts.json (documents family, content encrypted)
    pub fn scripts_file(&self) -> PathBuf {
        self.data_dir().join("scripts.json")
    }

    /// Get the path to vault.json (salt, validation token, settings)
    pub fn meta_file(&self) -> PathBuf {
        self.data_dir().join("vault.json")
    }

    /// Get the path to the session-expiry slot
    ///
    /// Deliberately outside `data/`: the slot is rewritten on every focus
    /// event and holds no vault content.
    pub fn expiry_file(&self) -> PathBuf {
        self.base_dir.join("session_expiry")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| VaultError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, VaultError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
    Ok(config_base.join("promptvault"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, VaultError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| VaultError::Io("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("promptvault"))
}
