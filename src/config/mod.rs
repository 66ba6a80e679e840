//! Configuration and path management for PromptVault

pub mod paths;

pub use paths::VaultPaths;
