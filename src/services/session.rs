//! Vault session
//!
//! Owns the live derived key and exposes script CRUD that transparently
//! encrypts and decrypts through the cipher and store. All document
//! operations fail while the session is locked; only the unlock/lock
//! transitions set or clear the key.

use chrono::{DateTime, Duration, Utc};

use crate::crypto::{decrypt_string, derive_key, encrypt_string, DerivedKey, EncryptedBlob, KeySalt};
use crate::error::{VaultError, VaultResult};
use crate::models::{NewScript, Script, ScriptId, ScriptPatch, VaultSettings};
use crate::models::script::validate_fields;
use crate::storage::{StoredScript, VaultStore};

use super::lifecycle::{LockLifecycle, LockReason};

/// Fixed marker encrypted into the validation token at first-time setup.
/// Decrypting the token back to this string proves the passphrase.
const VAULT_MARKER: &str = "promptvault_marker_v1";

/// Minimum passphrase length for first-time setup
const MIN_PASSPHRASE_LEN: usize = 12;

/// Result of a bulk listing with skip-and-report semantics
///
/// Scripts whose content fails to authenticate are omitted from `scripts`
/// and reported in `failed` so the caller can surface the count.
#[derive(Debug, Default)]
pub struct ScriptListing {
    /// Decrypted scripts, newest `updated_at` first
    pub scripts: Vec<Script>,
    /// Ids of records whose content could not be decrypted
    pub failed: Vec<ScriptId>,
}

type InvalidatedCallback = Box<dyn Fn(LockReason) + Send>;

/// A passphrase-protected vault session
///
/// One instance is constructed by the application's composition root and
/// passed by reference; the vault core never holds global state.
pub struct VaultSession {
    store: VaultStore,
    key: Option<DerivedKey>,
    lifecycle: Option<LockLifecycle>,
    on_invalidated: Option<InvalidatedCallback>,
}

impl VaultSession {
    /// Create a session over an opened store; starts Locked
    pub fn new(store: VaultStore) -> Self {
        Self {
            store,
            key: None,
            lifecycle: None,
            on_invalidated: None,
        }
    }

    /// Access the underlying store (read-only introspection)
    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    /// Subscribe to session invalidation
    ///
    /// The callback fires on every transition out of Unlocked with the
    /// reason; the UI layer uses it to reset its own view state.
    pub fn on_invalidated(&mut self, callback: impl Fn(LockReason) + Send + 'static) {
        self.on_invalidated = Some(Box::new(callback));
    }

    /// Whether a vault has been set up on this device
    pub fn has_existing_vault(&self) -> VaultResult<bool> {
        Ok(self.store.meta.validation_token()?.is_some())
    }

    /// Whether the session currently holds a live key
    pub fn is_unlocked(&self) -> bool {
        self.key.is_some()
    }

    /// Unlock the vault
    ///
    /// First-time: rejects weak passphrases with [`VaultError::WeakPassphrase`]
    /// before any key derivation or storage write, then creates the salt and
    /// validation token. Returning: verifies the passphrase against the
    /// stored token. Any internal failure is caught, the in-memory key is
    /// discarded, and `Ok(false)` is returned — unlock never partially
    /// succeeds and never reveals which vault piece was missing.
    pub fn unlock(&mut self, passphrase: &str, first_time: bool) -> VaultResult<bool> {
        if first_time {
            check_strength(passphrase)?;
            if self.has_existing_vault().unwrap_or(false) {
                return Err(VaultError::Validation(
                    "A vault already exists on this device".into(),
                ));
            }
        }

        let result = if first_time {
            self.unlock_first_time(passphrase)
        } else {
            self.unlock_returning(passphrase)
        };

        match result {
            Ok(()) => Ok(true),
            Err(_) => {
                self.key = None;
                self.lifecycle = None;
                Ok(false)
            }
        }
    }

    fn unlock_first_time(&mut self, passphrase: &str) -> VaultResult<()> {
        let salt = KeySalt::generate();
        let key = derive_key(passphrase, &salt)?;

        let token = encrypt_string(VAULT_MARKER, &key)?;
        self.store
            .meta
            .initialize_vault(salt, token.as_str().to_string())?;

        self.key = Some(key);
        self.start_lifecycle()?;
        Ok(())
    }

    fn unlock_returning(&mut self, passphrase: &str) -> VaultResult<()> {
        let salt = self
            .store
            .meta
            .salt()?
            .ok_or_else(|| VaultError::VaultCorrupt("Key salt record is missing".into()))?;
        let token = self
            .store
            .meta
            .validation_token()?
            .ok_or_else(|| VaultError::VaultCorrupt("Validation token is missing".into()))?;

        let key = derive_key(passphrase, &salt)?;

        let marker = decrypt_string(&EncryptedBlob::from_encoded(token), &key)
            .map_err(|_| VaultError::PassphraseMismatch)?;
        if marker != VAULT_MARKER {
            return Err(VaultError::VaultCorrupt(
                "Validation token decrypted to an unexpected marker".into(),
            ));
        }

        self.key = Some(key);
        self.start_lifecycle()?;
        Ok(())
    }

    fn start_lifecycle(&mut self) -> VaultResult<()> {
        let settings = self.store.meta.settings()?;
        let mut lifecycle = LockLifecycle::new(&settings);
        let expiry = lifecycle.start(Utc::now());
        self.store.expiry.write(expiry.timestamp_millis())?;
        self.lifecycle = Some(lifecycle);
        Ok(())
    }

    /// Lock the vault: discard the key, clear the expiry slot, cancel the
    /// lifecycle as a unit, and notify the invalidation subscriber.
    pub fn lock(&mut self) -> VaultResult<()> {
        self.invalidate(LockReason::Explicit)
    }

    fn invalidate(&mut self, reason: LockReason) -> VaultResult<()> {
        // Key first: it must be gone even if clearing the slot fails
        self.key = None;
        self.lifecycle = None;
        let cleared = self.store.expiry.clear();

        if let Some(callback) = &self.on_invalidated {
            callback(reason);
        }
        cleared
    }

    /// Periodic tick from the host environment
    ///
    /// Checks both auto-lock triggers and forces a lock when one fires.
    /// Returns the reason when the session was invalidated by this tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> VaultResult<Option<LockReason>> {
        let Some(lifecycle) = &self.lifecycle else {
            return Ok(None);
        };

        let persisted = self
            .store
            .expiry
            .read()
            .and_then(DateTime::from_timestamp_millis);

        if let Some(reason) = lifecycle.check(now, persisted) {
            self.invalidate(reason)?;
            return Ok(Some(reason));
        }
        Ok(None)
    }

    /// Foreground/background signal from the host environment
    pub fn set_focused(&mut self, focused: bool, now: DateTime<Utc>) -> VaultResult<()> {
        let Some(lifecycle) = &mut self.lifecycle else {
            return Ok(());
        };

        if focused {
            let expiry = lifecycle.focus_gained(now);
            self.store.expiry.write(expiry.timestamp_millis())?;
        } else {
            lifecycle.focus_lost(now);
        }
        Ok(())
    }

    /// Get the vault settings (available while locked; the record is
    /// plaintext and the lock screen needs the timeout configuration)
    pub fn settings(&self) -> VaultResult<VaultSettings> {
        self.store.meta.settings()
    }

    /// Replace the vault settings after validation
    pub fn update_settings(&mut self, settings: VaultSettings) -> VaultResult<()> {
        settings.validate()?;
        self.store.meta.set_settings(settings.clone())?;

        // A live session adopts the new timeouts immediately
        if self.key.is_some() {
            let mut lifecycle = LockLifecycle::new(&settings);
            let expiry = lifecycle.start(Utc::now());
            self.store.expiry.write(expiry.timestamp_millis())?;
            self.lifecycle = Some(lifecycle);
        }
        Ok(())
    }

    fn require_key(&self) -> VaultResult<&DerivedKey> {
        self.key.as_ref().ok_or(VaultError::NotUnlocked)
    }

    /// Create a script: assigns a fresh id and timestamps, encrypts the
    /// content, persists, and returns the plaintext script.
    pub fn save(&self, new: NewScript) -> VaultResult<Script> {
        let key = self.require_key()?;
        validate_fields(&new.title, &new.content)?;

        let display = match new.display {
            Some(display) => display,
            None => self.store.meta.settings()?.default_display,
        };

        let now = Utc::now();
        let blob = encrypt_string(&new.content, key)?;

        let stored = StoredScript {
            id: ScriptId::new(),
            title: new.title.clone(),
            content: blob.as_str().to_string(),
            display: display.clone(),
            created_at: now,
            updated_at: now,
        };
        self.store.scripts.upsert(stored.clone())?;
        self.store.scripts.save()?;

        Ok(Script {
            id: stored.id,
            title: new.title,
            content: new.content,
            display,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge partial fields over an existing script and persist
    ///
    /// `updated_at` strictly increases on every mutation, even within one
    /// clock millisecond.
    pub fn update(&self, id: ScriptId, patch: ScriptPatch) -> VaultResult<Script> {
        let key = self.require_key()?;

        let stored = self
            .store
            .scripts
            .get(id)?
            .ok_or_else(|| VaultError::script_not_found(id.to_string()))?;

        let existing_content = decrypt_string(&EncryptedBlob::from_encoded(stored.content), key)?;

        let title = patch.title.unwrap_or(stored.title);
        let content = patch.content.unwrap_or(existing_content);
        let display = patch.display.unwrap_or(stored.display);
        validate_fields(&title, &content)?;

        let now = Utc::now();
        let updated_at = if now > stored.updated_at {
            now
        } else {
            stored.updated_at + Duration::milliseconds(1)
        };

        let blob = encrypt_string(&content, key)?;
        let merged = StoredScript {
            id,
            title: title.clone(),
            content: blob.as_str().to_string(),
            display: display.clone(),
            created_at: stored.created_at,
            updated_at,
        };
        self.store.scripts.upsert(merged)?;
        self.store.scripts.save()?;

        Ok(Script {
            id,
            title,
            content,
            display,
            created_at: stored.created_at,
            updated_at,
        })
    }

    /// Load and decrypt a script; `None` when absent
    ///
    /// An authentication failure propagates as an error — it signals key
    /// mismatch or corruption and must not be conflated with "not found".
    pub fn get(&self, id: ScriptId) -> VaultResult<Option<Script>> {
        let key = self.require_key()?;

        let Some(stored) = self.store.scripts.get(id)? else {
            return Ok(None);
        };

        let content = decrypt_string(&EncryptedBlob::from_encoded(stored.content), key)?;
        Ok(Some(Script {
            id: stored.id,
            title: stored.title,
            content,
            display: stored.display,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }))
    }

    /// Decrypt every script, newest `updated_at` first
    ///
    /// Skip-and-report: a record that fails to decrypt is omitted and its id
    /// reported, so one corrupt row cannot hide every other script.
    pub fn get_all(&self) -> VaultResult<ScriptListing> {
        let key = self.require_key()?;

        let mut listing = ScriptListing::default();
        for stored in self.store.scripts.get_all()? {
            match decrypt_string(&EncryptedBlob::from_encoded(stored.content.clone()), key) {
                Ok(content) => listing.scripts.push(Script {
                    id: stored.id,
                    title: stored.title,
                    content,
                    display: stored.display,
                    created_at: stored.created_at,
                    updated_at: stored.updated_at,
                }),
                Err(VaultError::Authentication(_)) | Err(VaultError::Encryption(_)) => {
                    listing.failed.push(stored.id);
                }
                Err(other) => return Err(other),
            }
        }
        Ok(listing)
    }

    /// Remove a script; deleting an unknown id is not an error
    pub fn delete(&self, id: ScriptId) -> VaultResult<()> {
        self.require_key()?;

        if self.store.scripts.delete(id)? {
            self.store.scripts.save()?;
        }
        Ok(())
    }
}

/// Enforce the first-time passphrase strength policy
fn check_strength(passphrase: &str) -> VaultResult<()> {
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(VaultError::WeakPassphrase(format!(
            "must be at least {} characters",
            MIN_PASSPHRASE_LEN
        )));
    }
    if !passphrase.chars().any(|c| c.is_lowercase()) {
        return Err(VaultError::WeakPassphrase(
            "must contain a lowercase letter".into(),
        ));
    }
    if !passphrase.chars().any(|c| c.is_uppercase()) {
        return Err(VaultError::WeakPassphrase(
            "must contain an uppercase letter".into(),
        ));
    }
    if !passphrase.chars().any(|c| c.is_ascii_digit()) {
        return Err(VaultError::WeakPassphrase("must contain a digit".into()));
    }
    if !passphrase.chars().any(|c| !c.is_alphanumeric()) {
        return Err(VaultError::WeakPassphrase("must contain a symbol".into()));
    }
    Ok(())
}
