//! Service layer for PromptVault
//!
//! The session service owns the live key and drives document CRUD through
//! the cipher and store; the lifecycle service decides when an unlocked
//! session must be forcibly invalidated.

pub mod lifecycle;
pub mod session;

pub use lifecycle::{LockLifecycle, LockReason};
pub use session::{ScriptListing, VaultSession};
