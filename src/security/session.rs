//! Session secret cache.
//!
//! Holds the unlock password for the lifetime of a session so switching
//! between wallets does not re-prompt. The password is never stored in the
//! clear: it is wrapped under a random ephemeral key in an AES-GCM envelope
//! `{k, iv, d}` kept in a session-scoped store. Locking erases the envelope
//! and the in-memory keys synchronously; after `lock()` returns, no code
//! path can produce a signature without a fresh password.

use std::time::{Duration, Instant};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::errors::WalletError;
use crate::crypto::derivation::AccountKeys;

const SESSION_KEY_LEN: usize = 32;
const SESSION_IV_LEN: usize = 12;

/// Lock state of the active wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    /// A decrypt/derive cycle is in flight. Completions observed in any
    /// other state are stale and must be discarded.
    Unlocking,
    Unlocked,
}

/// The wrapped session password: ephemeral key, IV and ciphertext, all
/// Base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnvelope {
    pub k: String,
    pub iv: String,
    pub d: String,
}

/// Session-scoped storage for the password envelope.
///
/// Implementations must not persist: the envelope dies with the session.
pub trait SessionStore: Send + Sync {
    fn put(&self, envelope: SessionEnvelope);
    fn get(&self) -> Option<SessionEnvelope>;
    fn clear(&self);
}

/// In-memory store, the default. One envelope slot per session.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<SessionEnvelope>>,
}

impl SessionStore for MemorySessionStore {
    fn put(&self, envelope: SessionEnvelope) {
        *self.slot.write() = Some(envelope);
    }

    fn get(&self) -> Option<SessionEnvelope> {
        self.slot.read().clone()
    }

    fn clear(&self) {
        *self.slot.write() = None;
    }
}

struct SessionInner {
    state: SessionState,
    keys: Option<AccountKeys>,
    last_activity: Instant,
}

/// Owner of the in-memory key material and the wrapped password.
///
/// All state transitions go through this object; there is no ambient
/// global. `Locked -> Unlocking -> Unlocked -> Locked`.
pub struct SessionCache {
    store: Box<dyn SessionStore>,
    inner: RwLock<SessionInner>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::with_store(Box::new(MemorySessionStore::default()))
    }

    pub fn with_store(store: Box<dyn SessionStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(SessionInner {
                state: SessionState::Locked,
                keys: None,
                last_activity: Instant::now(),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.read().state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == SessionState::Unlocked
    }

    /// Marks the start of an unlock attempt. Key material from a previous
    /// session stays valid until `complete_unlock` or `lock` replaces it.
    pub fn begin_unlock(&self) {
        let mut inner = self.inner.write();
        if inner.state == SessionState::Locked {
            inner.state = SessionState::Unlocking;
        }
    }

    /// Installs freshly derived keys and, when a password was supplied,
    /// wraps it into the session store for silent re-unlock later.
    pub fn complete_unlock(
        &self,
        keys: AccountKeys,
        password: Option<&str>,
    ) -> Result<(), WalletError> {
        if let Some(password) = password {
            match wrap_password(password) {
                Ok(envelope) => self.store.put(envelope),
                // A failed wrap only costs the silent re-unlock convenience;
                // the unlock itself proceeds.
                Err(e) => warn!("Session envelope encryption failed: {}", e),
            }
        }

        let mut inner = self.inner.write();
        inner.keys = Some(keys);
        inner.state = SessionState::Unlocked;
        inner.last_activity = Instant::now();
        debug!("Session unlocked");
        Ok(())
    }

    /// Reverts an unlock attempt that failed downstream.
    pub fn abort_unlock(&self) {
        let mut inner = self.inner.write();
        if inner.state == SessionState::Unlocking {
            inner.state = SessionState::Locked;
        }
    }

    /// Erases the envelope and the in-memory keys. Synchronous.
    pub fn lock(&self) {
        self.store.clear();
        let mut inner = self.inner.write();
        // AccountKeys zeroizes its secret on drop.
        inner.keys = None;
        inner.state = SessionState::Locked;
        debug!("Session locked");
    }

    /// Drops key material and returns to `Locked`, but keeps the password
    /// envelope so a later wallet switch can still re-unlock silently.
    pub fn lock_keys_only(&self) {
        let mut inner = self.inner.write();
        inner.keys = None;
        inner.state = SessionState::Locked;
    }

    /// The active account keys, or `SessionExpiredOrLocked`.
    pub fn keys(&self) -> Result<AccountKeys, WalletError> {
        let inner = self.inner.read();
        match (&inner.state, &inner.keys) {
            (SessionState::Unlocked, Some(keys)) => Ok(keys.clone()),
            _ => Err(WalletError::SessionExpiredOrLocked),
        }
    }

    /// The active account address, if unlocked.
    pub fn address(&self) -> Option<String> {
        let inner = self.inner.read();
        match inner.state {
            SessionState::Unlocked => inner.keys.as_ref().map(|k| k.address.clone()),
            _ => None,
        }
    }

    /// Recovers the session password from the envelope.
    ///
    /// Any failure clears the envelope and yields `None`; the caller falls
    /// back to prompting.
    pub fn cached_password(&self) -> Option<Zeroizing<String>> {
        let envelope = self.store.get()?;
        match unwrap_password(&envelope) {
            Ok(password) => Some(password),
            Err(e) => {
                warn!("Session envelope decryption failed, clearing: {}", e);
                self.store.clear();
                None
            }
        }
    }

    /// Records user activity for auto-lock accounting.
    pub fn touch(&self) {
        self.inner.write().last_activity = Instant::now();
    }

    /// Whether the session has been idle past the timeout. A zero timeout
    /// means "never expires".
    pub fn is_expired(&self, timeout: Duration) -> bool {
        if timeout.is_zero() {
            return false;
        }
        let inner = self.inner.read();
        inner.state == SessionState::Unlocked && inner.last_activity.elapsed() >= timeout
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a password under a fresh ephemeral key.
pub fn wrap_password(password: &str) -> Result<SessionEnvelope, WalletError> {
    let mut session_key = Zeroizing::new([0u8; SESSION_KEY_LEN]);
    OsRng.fill_bytes(session_key.as_mut());
    let mut iv = [0u8; SESSION_IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new_from_slice(session_key.as_ref())
        .map_err(|_| WalletError::CryptoError("Invalid session key length".to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), password.as_bytes())
        .map_err(|_| WalletError::CryptoError("Session encryption failed".to_string()))?;

    Ok(SessionEnvelope {
        k: BASE64.encode(session_key.as_ref()),
        iv: BASE64.encode(iv),
        d: BASE64.encode(ciphertext),
    })
}

/// Unwraps an envelope back to the password.
pub fn unwrap_password(envelope: &SessionEnvelope) -> Result<Zeroizing<String>, WalletError> {
    let key = BASE64
        .decode(&envelope.k)
        .map_err(|_| WalletError::CryptoError("Malformed session envelope".to_string()))?;
    let iv = BASE64
        .decode(&envelope.iv)
        .map_err(|_| WalletError::CryptoError("Malformed session envelope".to_string()))?;
    let data = BASE64
        .decode(&envelope.d)
        .map_err(|_| WalletError::CryptoError("Malformed session envelope".to_string()))?;
    if key.len() != SESSION_KEY_LEN || iv.len() != SESSION_IV_LEN {
        return Err(WalletError::CryptoError("Malformed session envelope".to_string()));
    }
    let key = Zeroizing::new(key);

    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|_| WalletError::CryptoError("Invalid session key length".to_string()))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), data.as_slice())
        .map_err(|_| WalletError::CryptoError("Session decryption failed".to_string()))?;

    let password = String::from_utf8(plaintext)
        .map_err(|_| WalletError::CryptoError("Session plaintext is not UTF-8".to_string()))?;
    Ok(Zeroizing::new(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::derivation::derive_account_zero;

    const MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_keys() -> AccountKeys {
        derive_account_zero(MNEMONIC).unwrap()
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let envelope = wrap_password("hunter2 with unicode ✓").unwrap();
        let recovered = unwrap_password(&envelope).unwrap();
        assert_eq!(&*recovered, "hunter2 with unicode ✓");
    }

    #[test]
    fn test_envelope_fields_are_base64() {
        let envelope = wrap_password("pw").unwrap();
        assert_eq!(BASE64.decode(&envelope.k).unwrap().len(), 32);
        assert_eq!(BASE64.decode(&envelope.iv).unwrap().len(), 12);
        assert!(!BASE64.decode(&envelope.d).unwrap().is_empty());
    }

    #[test]
    fn test_unwrap_rejects_tampered_data() {
        let mut envelope = wrap_password("pw").unwrap();
        let mut raw = BASE64.decode(&envelope.d).unwrap();
        raw[0] ^= 0x01;
        envelope.d = BASE64.encode(raw);
        assert!(unwrap_password(&envelope).is_err());
    }

    #[test]
    fn test_unwrap_rejects_wrong_key_sizes() {
        let mut envelope = wrap_password("pw").unwrap();
        envelope.k = BASE64.encode([0u8; 16]);
        assert!(unwrap_password(&envelope).is_err());
    }

    #[test]
    fn test_state_machine_transitions() {
        let cache = SessionCache::new();
        assert_eq!(cache.state(), SessionState::Locked);

        cache.begin_unlock();
        assert_eq!(cache.state(), SessionState::Unlocking);

        cache.complete_unlock(test_keys(), Some("pw")).unwrap();
        assert_eq!(cache.state(), SessionState::Unlocked);

        cache.lock();
        assert_eq!(cache.state(), SessionState::Locked);
    }

    #[test]
    fn test_abort_returns_to_locked() {
        let cache = SessionCache::new();
        cache.begin_unlock();
        cache.abort_unlock();
        assert_eq!(cache.state(), SessionState::Locked);
    }

    #[test]
    fn test_abort_does_not_demote_unlocked() {
        let cache = SessionCache::new();
        cache.begin_unlock();
        cache.complete_unlock(test_keys(), None).unwrap();
        cache.abort_unlock();
        assert_eq!(cache.state(), SessionState::Unlocked);
    }

    #[test]
    fn test_keys_unavailable_when_locked() {
        let cache = SessionCache::new();
        assert!(matches!(cache.keys(), Err(WalletError::SessionExpiredOrLocked)));

        cache.begin_unlock();
        assert!(matches!(cache.keys(), Err(WalletError::SessionExpiredOrLocked)));
    }

    #[test]
    fn test_lock_erases_everything() {
        let cache = SessionCache::new();
        cache.begin_unlock();
        cache.complete_unlock(test_keys(), Some("pw")).unwrap();
        assert!(cache.keys().is_ok());
        assert!(cache.cached_password().is_some());

        cache.lock();
        assert!(matches!(cache.keys(), Err(WalletError::SessionExpiredOrLocked)));
        assert!(cache.cached_password().is_none());
        assert!(cache.address().is_none());
    }

    #[test]
    fn test_lock_keys_only_preserves_envelope() {
        let cache = SessionCache::new();
        cache.begin_unlock();
        cache.complete_unlock(test_keys(), Some("pw")).unwrap();

        cache.lock_keys_only();
        assert_eq!(cache.state(), SessionState::Locked);
        assert!(cache.keys().is_err());
        assert!(cache.cached_password().is_some());
    }

    #[test]
    fn test_cached_password_roundtrip() {
        let cache = SessionCache::new();
        cache.begin_unlock();
        cache.complete_unlock(test_keys(), Some("Str0ng!Pass")).unwrap();

        let cached = cache.cached_password().unwrap();
        assert_eq!(&*cached, "Str0ng!Pass");
    }

    #[test]
    fn test_no_envelope_without_password() {
        let cache = SessionCache::new();
        cache.begin_unlock();
        cache.complete_unlock(test_keys(), None).unwrap();
        assert!(cache.cached_password().is_none());
    }

    #[test]
    fn test_corrupted_envelope_clears_store() {
        let store = MemorySessionStore::default();
        store.put(SessionEnvelope {
            k: "garbage".to_string(),
            iv: "garbage".to_string(),
            d: "garbage".to_string(),
        });
        let cache = SessionCache::with_store(Box::new(store));

        assert!(cache.cached_password().is_none());
        // Second read: the bad envelope was dropped.
        assert!(cache.cached_password().is_none());
    }

    #[test]
    fn test_expiry() {
        let cache = SessionCache::new();
        cache.begin_unlock();
        cache.complete_unlock(test_keys(), None).unwrap();

        assert!(!cache.is_expired(Duration::from_secs(3600)));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.is_expired(Duration::from_millis(1)));
        // Zero timeout disables expiry.
        assert!(!cache.is_expired(Duration::ZERO));

        cache.touch();
        assert!(!cache.is_expired(Duration::from_secs(3600)));
    }

    #[test]
    fn test_locked_session_never_expired() {
        let cache = SessionCache::new();
        assert!(!cache.is_expired(Duration::from_nanos(1)));
    }
}
