//! Usage: Token set model and the `SessionStore` seam (save / load / clear).
//!
//! A session exists exactly when the store holds a token set. The store is injected into the
//! handlers that need it; `MemorySessionStore` backs tests and ephemeral runs, the durable
//! file-backed store lives in `infra::session_file`.

use crate::shared::error::AppResult;
use crate::shared::mutex_ext::MutexExt;
use crate::shared::security::mask_token;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const ACCESS_TOKEN_KEY: &str = "strava_access_token";
pub const REFRESH_TOKEN_KEY: &str = "strava_refresh_token";
pub const EXPIRES_AT_KEY: &str = "strava_expires_at";

/// Persisted key/value form of a session (every value is a string, like browser local storage).
pub type StoredEntries = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token set requires a non-empty access_token")]
pub struct MissingAccessToken;

#[derive(Clone, PartialEq, Eq)]
pub struct TokenSet {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

impl TokenSet {
    /// Empty optional values are normalized to `None`; an empty access token is rejected.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: Option<i64>,
    ) -> Result<Self, MissingAccessToken> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(MissingAccessToken);
        }
        Ok(Self {
            access_token,
            refresh_token: refresh_token.filter(|v| !v.trim().is_empty()),
            expires_at,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    /// Informational only; the session guard never consults it.
    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now_unix)
    }

    pub fn to_entries(&self) -> StoredEntries {
        let mut entries = StoredEntries::new();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), self.access_token.clone());
        if let Some(refresh) = &self.refresh_token {
            entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.clone());
        }
        if let Some(expiry) = self.expires_at {
            entries.insert(EXPIRES_AT_KEY.to_string(), expiry.to_string());
        }
        entries
    }

    /// Rebuild from stored entries. Missing optional keys stay absent; an expiry that no longer
    /// parses is dropped rather than invalidating the whole session.
    pub fn from_entries(entries: &StoredEntries) -> Option<Self> {
        let access_token = entries.get(ACCESS_TOKEN_KEY)?;
        let refresh_token = entries.get(REFRESH_TOKEN_KEY).cloned();
        let expires_at = entries.get(EXPIRES_AT_KEY).and_then(|raw| {
            let parsed = raw.trim().parse::<i64>().ok();
            if parsed.is_none() {
                tracing::warn!("stored session expiry is not a unix timestamp; ignoring it");
            }
            parsed
        });
        TokenSet::new(access_token.clone(), refresh_token, expires_at).ok()
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &mask_token(&self.access_token))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(mask_token),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// `TokenSet` cannot be built without an access token, so every `save` persists a valid session.
pub trait SessionStore: Send + Sync {
    /// Replace the stored session with `tokens` (stale optional keys are removed).
    fn save(&self, tokens: &TokenSet) -> AppResult<()>;

    fn load(&self) -> AppResult<Option<TokenSet>>;

    /// Remove all session keys. Clearing an empty store is not an error.
    fn clear(&self) -> AppResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<StoredEntries>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw key/value view, as a browser storage inspector would show it.
    pub fn entries(&self) -> StoredEntries {
        self.entries.lock_or_recover().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, tokens: &TokenSet) -> AppResult<()> {
        *self.entries.lock_or_recover() = tokens.to_entries();
        Ok(())
    }

    fn load(&self) -> AppResult<Option<TokenSet>> {
        Ok(TokenSet::from_entries(&self.entries.lock_or_recover()))
    }

    fn clear(&self) -> AppResult<()> {
        let mut guard = self.entries.lock_or_recover();
        guard.remove(ACCESS_TOKEN_KEY);
        guard.remove(REFRESH_TOKEN_KEY);
        guard.remove(EXPIRES_AT_KEY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_token_set() -> TokenSet {
        TokenSet::new("tok1", Some("ref1".to_string()), Some(1_700_000_000)).expect("tokens")
    }

    #[test]
    fn token_set_rejects_empty_access_token() {
        assert_eq!(TokenSet::new("", None, None), Err(MissingAccessToken));
        assert_eq!(TokenSet::new("   ", None, None), Err(MissingAccessToken));
    }

    #[test]
    fn token_set_normalizes_empty_refresh_token() {
        let tokens = TokenSet::new("tok1", Some(String::new()), None).expect("tokens");
        assert_eq!(tokens.refresh_token(), None);
    }

    #[test]
    fn entries_encode_expiry_as_string() {
        let entries = full_token_set().to_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("tok1"));
        assert_eq!(entries.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("ref1"));
        assert_eq!(
            entries.get(EXPIRES_AT_KEY).map(String::as_str),
            Some("1700000000")
        );
    }

    #[test]
    fn from_entries_drops_unparseable_expiry() {
        let mut entries = StoredEntries::new();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), "tok1".to_string());
        entries.insert(EXPIRES_AT_KEY.to_string(), "soon".to_string());
        let tokens = TokenSet::from_entries(&entries).expect("tokens");
        assert_eq!(tokens.access_token(), "tok1");
        assert_eq!(tokens.expires_at(), None);
    }

    #[test]
    fn from_entries_without_access_token_is_absent() {
        let mut entries = StoredEntries::new();
        entries.insert(REFRESH_TOKEN_KEY.to_string(), "ref1".to_string());
        assert!(TokenSet::from_entries(&entries).is_none());
    }

    #[test]
    fn memory_store_save_then_load_round_trips_access_token() {
        let store = MemorySessionStore::new();
        store.save(&full_token_set()).expect("save");
        let loaded = store.load().expect("load").expect("session");
        assert_eq!(loaded, full_token_set());
    }

    #[test]
    fn memory_store_omitted_optionals_load_as_absent() {
        let store = MemorySessionStore::new();
        store
            .save(&TokenSet::new("tok1", None, None).expect("tokens"))
            .expect("save");
        let loaded = store.load().expect("load").expect("session");
        assert_eq!(loaded.refresh_token(), None);
        assert_eq!(loaded.expires_at(), None);
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn memory_store_save_replaces_stale_optionals() {
        let store = MemorySessionStore::new();
        store.save(&full_token_set()).expect("save full");
        store
            .save(&TokenSet::new("tok2", None, None).expect("tokens"))
            .expect("save bare");
        let loaded = store.load().expect("load").expect("session");
        assert_eq!(loaded.access_token(), "tok2");
        assert_eq!(loaded.refresh_token(), None);
        assert_eq!(loaded.expires_at(), None);
    }

    #[test]
    fn memory_store_clear_then_load_is_absent() {
        let store = MemorySessionStore::new();
        store.save(&full_token_set()).expect("save");
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
        assert!(store.entries().is_empty());
        store.clear().expect("clear twice");
    }

    #[test]
    fn expiry_check_is_informational() {
        let tokens = full_token_set();
        assert!(!tokens.is_expired_at(1_699_999_999));
        assert!(tokens.is_expired_at(1_700_000_000));
        let no_expiry = TokenSet::new("tok1", None, None).expect("tokens");
        assert!(!no_expiry.is_expired_at(i64::MAX));
    }

    #[test]
    fn debug_masks_tokens() {
        let tokens =
            TokenSet::new("abcdef1234567890", Some("zyxwvu0987654321".to_string()), None)
                .expect("tokens");
        let rendered = format!("{tokens:?}");
        assert!(!rendered.contains("abcdef1234567890"));
        assert!(!rendered.contains("zyxwvu0987654321"));
    }
}
