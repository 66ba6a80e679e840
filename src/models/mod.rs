//! Core data models for PromptVault

pub mod ids;
pub mod script;
pub mod settings;

pub use ids::ScriptId;
pub use script::{DisplaySettings, NewScript, Script, ScriptPatch};
pub use settings::VaultSettings;
