//! Cryptographic functions for PromptVault
//!
//! Provides AES-256-GCM encryption with PBKDF2-HMAC-SHA512 key derivation
//! for at-rest encryption of script content.

pub mod encryption;
pub mod key_derivation;

pub use encryption::{decrypt_string, encrypt_string, EncryptedBlob};
pub use key_derivation::{derive_key, DerivedKey, KeySalt};
