//! Script model
//!
//! Represents a teleprompter script as the caller sees it: plaintext content
//! plus presentation attributes. The encrypted at-rest form lives in the
//! storage layer; this model never carries ciphertext.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

use super::ids::ScriptId;

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum plaintext content length in characters
pub const MAX_CONTENT_LEN: usize = 100_000;

/// Presentation attributes for a script
///
/// Stored unencrypted: none of these are sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Scroll speed in pixels per second
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: u32,

    /// Text color as a hex string (e.g. "#ffffff")
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Background color as a hex string
    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Mirror the text horizontally for beam-splitter glass
    #[serde(default)]
    pub mirror: bool,

    /// Render the script in all caps
    #[serde(default)]
    pub all_caps: bool,
}

fn default_font_size() -> u32 {
    48
}

fn default_scroll_speed() -> u32 {
    40
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

fn default_background_color() -> String {
    "#000000".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            scroll_speed: default_scroll_speed(),
            text_color: default_text_color(),
            background_color: default_background_color(),
            mirror: false,
            all_caps: false,
        }
    }
}

/// A teleprompter script with decrypted content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Unique identifier, immutable for the script's lifetime
    pub id: ScriptId,

    /// Script title (plaintext at rest)
    pub title: String,

    /// Script body (ciphertext at rest, plaintext here)
    pub content: String,

    /// Presentation attributes
    #[serde(default)]
    pub display: DisplaySettings,

    /// When the script was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// When the script was last modified; strictly increases on every mutation
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Script {
    /// Validate the title and content bounds
    pub fn validate(&self) -> VaultResult<()> {
        validate_fields(&self.title, &self.content)
    }
}

/// Validate title/content limits shared by save and update paths
pub fn validate_fields(title: &str, content: &str) -> VaultResult<()> {
    if title.trim().is_empty() {
        return Err(VaultError::Validation("Script title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(VaultError::Validation(format!(
            "Script title exceeds {} characters",
            MAX_TITLE_LEN
        )));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(VaultError::Validation(format!(
            "Script content exceeds {} characters",
            MAX_CONTENT_LEN
        )));
    }
    Ok(())
}

/// Fields for creating a script; id and timestamps are assigned by the vault
#[derive(Debug, Clone)]
pub struct NewScript {
    pub title: String,
    pub content: String,
    /// Presentation attributes; vault defaults apply when absent
    pub display: Option<DisplaySettings>,
}

impl NewScript {
    /// Create a new script request with default presentation
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            display: None,
        }
    }
}

/// Partial fields for updating a script; absent fields keep their values
#[derive(Debug, Clone, Default)]
pub struct ScriptPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub display: Option<DisplaySettings>,
}

impl ScriptPatch {
    /// Patch that only replaces the content
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Patch that only replaces the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_defaults() {
        let display = DisplaySettings::default();
        assert_eq!(display.font_size, 48);
        assert_eq!(display.scroll_speed, 40);
        assert!(!display.mirror);
    }

    #[test]
    fn test_validate_accepts_normal_fields() {
        assert!(validate_fields("Evening broadcast", "Good evening.").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let err = validate_fields("   ", "content").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_rejects_long_title() {
        let title = "t".repeat(MAX_TITLE_LEN + 1);
        let err = validate_fields(&title, "content").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_rejects_long_content() {
        let content = "c".repeat(MAX_CONTENT_LEN + 1);
        let err = validate_fields("title", &content).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_accepts_content_at_limit() {
        let content = "c".repeat(MAX_CONTENT_LEN);
        assert!(validate_fields("title", &content).is_ok());
    }

    #[test]
    fn test_timestamps_serialize_as_epoch_millis() {
        let script = Script {
            id: ScriptId::new(),
            title: "t".into(),
            content: "c".into(),
            display: DisplaySettings::default(),
            created_at: chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            updated_at: chrono::DateTime::from_timestamp_millis(1_700_000_000_001).unwrap(),
        };
        let json = serde_json::to_value(&script).unwrap();
        assert_eq!(json["created_at"], 1_700_000_000_000i64);
        assert_eq!(json["updated_at"], 1_700_000_000_001i64);
    }
}
