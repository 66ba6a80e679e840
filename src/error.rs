//! Custom error types for PromptVault
//!
//! This module defines the error hierarchy for the vault using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// First-time passphrase fails the strength policy
    #[error("Passphrase too weak: {0}")]
    WeakPassphrase(String),

    /// Returning unlock with a passphrase that does not match the vault
    #[error("Passphrase does not match this vault")]
    PassphraseMismatch,

    /// Salt or validation token missing/malformed when expected
    #[error("Vault is corrupt: {0}")]
    VaultCorrupt(String),

    /// Document operation attempted while the session is locked
    #[error("Vault is locked")]
    NotUnlocked,

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Ciphertext failed to authenticate (tampering, truncation, wrong key)
    #[error("Authentication failure: {0}")]
    Authentication(String),

    /// Underlying persistence failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and settings
    #[error("Validation error: {0}")]
    Validation(String),

    /// Key derivation or cipher construction failures
    #[error("Encryption error: {0}")]
    Encryption(String),
}

impl VaultError {
    /// Create a "not found" error for scripts
    pub fn script_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Script",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an authentication failure
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::NotUnlocked;
        assert_eq!(err.to_string(), "Vault is locked");
    }

    #[test]
    fn test_not_found_error() {
        let err = VaultError::script_not_found("abc123");
        assert_eq!(err.to_string(), "Script not found: abc123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_authentication_predicate() {
        let err = VaultError::Authentication("tag mismatch".into());
        assert!(err.is_authentication());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vault_err: VaultError = io_err.into();
        assert!(matches!(vault_err, VaultError::Io(_)));
    }
}
