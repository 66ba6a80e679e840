//! Vault settings
//!
//! Singleton plaintext record holding default presentation attributes and the
//! auto-lock timeout configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

use super::script::DisplaySettings;

/// Minimum session timeout in minutes
pub const MIN_SESSION_TIMEOUT_MIN: u32 = 5;
/// Maximum session timeout in minutes (8 hours)
pub const MAX_SESSION_TIMEOUT_MIN: u32 = 480;
/// Minimum inactivity timeout in minutes
pub const MIN_INACTIVITY_TIMEOUT_MIN: u32 = 5;
/// Maximum inactivity timeout in minutes (2 hours)
pub const MAX_INACTIVITY_TIMEOUT_MIN: u32 = 120;

/// User settings for the vault
///
/// Created lazily with defaults on first read. Stored unencrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Default presentation attributes for new scripts
    #[serde(default)]
    pub default_display: DisplaySettings,

    /// Unlocked session lifetime in minutes
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u32,

    /// Idle time while unfocused before forced lock, in minutes
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_minutes: u32,
}

fn default_session_timeout() -> u32 {
    60
}

fn default_inactivity_timeout() -> u32 {
    15
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            default_display: DisplaySettings::default(),
            session_timeout_minutes: default_session_timeout(),
            inactivity_timeout_minutes: default_inactivity_timeout(),
        }
    }
}

impl VaultSettings {
    /// Validate timeout bounds
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> VaultResult<()> {
        if self.session_timeout_minutes < MIN_SESSION_TIMEOUT_MIN
            || self.session_timeout_minutes > MAX_SESSION_TIMEOUT_MIN
        {
            return Err(VaultError::Validation(format!(
                "Session timeout must be between {} and {} minutes",
                MIN_SESSION_TIMEOUT_MIN, MAX_SESSION_TIMEOUT_MIN
            )));
        }
        if self.inactivity_timeout_minutes < MIN_INACTIVITY_TIMEOUT_MIN
            || self.inactivity_timeout_minutes > MAX_INACTIVITY_TIMEOUT_MIN
        {
            return Err(VaultError::Validation(format!(
                "Inactivity timeout must be between {} and {} minutes",
                MIN_INACTIVITY_TIMEOUT_MIN, MAX_INACTIVITY_TIMEOUT_MIN
            )));
        }
        Ok(())
    }

    /// Session timeout as a duration
    pub fn session_timeout(&self) -> Duration {
        Duration::minutes(i64::from(self.session_timeout_minutes))
    }

    /// Inactivity timeout as a duration
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::minutes(i64::from(self.inactivity_timeout_minutes))
    }
}
