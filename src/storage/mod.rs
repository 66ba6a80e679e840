//! Storage layer for PromptVault
//!
//! Provides JSON file persistence with atomic writes, partitioned into two
//! record families: scripts (content is an opaque ciphertext blob) and vault
//! metadata (salt, validation token, settings). The layer has no crypto
//! awareness and must not be trusted to keep secrets.

pub mod expiry;
pub mod file_io;
pub mod meta;
pub mod scripts;

pub use expiry::ExpirySlot;
pub use file_io::{read_json, write_json_atomic};
pub use meta::MetaRepository;
pub use scripts::{ScriptRepository, StoredScript};

use crate::config::VaultPaths;
use crate::error::VaultError;

/// Main storage coordinator that provides access to all record families
pub struct VaultStore {
    paths: VaultPaths,
    pub scripts: ScriptRepository,
    pub meta: MetaRepository,
    pub expiry: ExpirySlot,
}

impl VaultStore {
    /// Create a new VaultStore instance
    pub fn new(paths: VaultPaths) -> Result<Self, VaultError> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            scripts: ScriptRepository::new(paths.scripts_file()),
            meta: MetaRepository::new(paths.meta_file()),
            expiry: ExpirySlot::new(paths.expiry_file()),
            paths,
        })
    }

    /// Create a store and load both record families from disk
    pub fn open(paths: VaultPaths) -> Result<Self, VaultError> {
        let store = Self::new(paths)?;
        store.load_all()?;
        Ok(store)
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), VaultError> {
        self.scripts.load()?;
        self.meta.load()?;
        Ok(())
    }
}
