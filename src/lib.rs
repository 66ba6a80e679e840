//! PromptVault - Encrypted local vault for teleprompter scripts
//!
//! This library provides the core functionality for PromptVault: a local,
//! passphrase-protected store for teleprompter scripts. Script content is
//! encrypted at rest with a key derived from the user's passphrase; the
//! passphrase itself is never persisted.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path management for the on-disk layout
//! - `error`: Custom error types
//! - `models`: Core data models (scripts, display settings, vault settings)
//! - `crypto`: Key derivation and authenticated encryption
//! - `storage`: JSON file storage layer (no crypto awareness)
//! - `services`: Vault session and lock lifecycle
//!
//! # Example
//!
//! ```rust,ignore
//! use promptvault::config::VaultPaths;
//! use promptvault::services::VaultSession;
//! use promptvault::storage::VaultStore;
//!
//! let paths = VaultPaths::new()?;
//! let store = VaultStore::open(paths)?;
//! let mut session = VaultSession::new(store);
//! session.unlock(&passphrase, false)?;
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{VaultError, VaultResult};
