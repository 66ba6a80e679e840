//! Lock lifecycle management
//!
//! Pure state transition logic over timestamps. The host environment supplies
//! two inputs: a periodic tick and a foreground/background signal; this module
//! decides when the session must be forcibly locked. It holds no timers and
//! does no I/O — the session persists the expiry timestamps it computes.
//!
//! Two independent triggers:
//! - session expiry: an absolute deadline persisted outside the store,
//!   refreshed on unlock and on every focus-gain
//! - inactivity: a deadline armed on focus loss and disarmed on focus gain

use chrono::{DateTime, Duration, Utc};

use crate::models::VaultSettings;

/// Why a session left the Unlocked state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    /// Caller invoked `lock()` directly
    Explicit,
    /// The persisted session expiry passed
    Expired,
    /// The app stayed unfocused past the inactivity timeout
    Inactive,
}

impl std::fmt::Display for LockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "locked"),
            Self::Expired => write!(f, "session expired"),
            Self::Inactive => write!(f, "inactivity timeout"),
        }
    }
}

/// Auto-lock policy state for one unlocked session
#[derive(Debug)]
pub struct LockLifecycle {
    session_timeout: Duration,
    inactivity_timeout: Duration,
    /// Armed while the app is unfocused
    inactivity_deadline: Option<DateTime<Utc>>,
    focused: bool,
}

impl LockLifecycle {
    /// Create lifecycle state from the vault settings
    pub fn new(settings: &VaultSettings) -> Self {
        Self {
            session_timeout: settings.session_timeout(),
            inactivity_timeout: settings.inactivity_timeout(),
            inactivity_deadline: None,
            focused: true,
        }
    }

    /// Begin a session at `now`; returns the expiry deadline to persist
    pub fn start(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.inactivity_deadline = None;
        self.focused = true;
        now + self.session_timeout
    }

    /// The app regained foreground focus
    ///
    /// Disarms the inactivity deadline and returns a refreshed expiry
    /// deadline to persist.
    pub fn focus_gained(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.focused = true;
        self.inactivity_deadline = None;
        now + self.session_timeout
    }

    /// The app lost foreground focus; arms the inactivity deadline
    pub fn focus_lost(&mut self, now: DateTime<Utc>) {
        self.focused = false;
        self.inactivity_deadline = Some(now + self.inactivity_timeout);
    }

    /// Periodic check against both triggers
    ///
    /// `persisted_expiry` is the deadline currently on disk; a missing value
    /// for a live session counts as already expired.
    pub fn check(
        &self,
        now: DateTime<Utc>,
        persisted_expiry: Option<DateTime<Utc>>,
    ) -> Option<LockReason> {
        match persisted_expiry {
            Some(expiry) if now <= expiry => {}
            _ => return Some(LockReason::Expired),
        }

        if !self.focused {
            if let Some(deadline) = self.inactivity_deadline {
                if now >= deadline {
                    return Some(LockReason::Inactive);
                }
            }
        }

        None
    }
}
