use std::sync::{Arc, RwLock};

use tracing::debug;

use super::storage::KeyValueStorage;

/// Storage key holding the raw bearer token
pub const TOKEN_STORAGE_KEY: &str = "vitrine_token";

/// Holds the session token in memory and mirrors it to persistent storage.
///
/// Token presence is the only authentication signal the client trusts. There
/// is no validation, refresh or expiry handling; a stale token is discovered
/// when the content service answers with an authorization failure.
#[derive(Clone)]
pub struct SessionStore {
    token: Arc<RwLock<Option<String>>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Create a store, picking up any token persisted by a previous run.
    /// An empty persisted value is treated as no token at all.
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        let token = storage.get(TOKEN_STORAGE_KEY).filter(|token| !token.is_empty());
        if token.is_some() {
            debug!("Restored persisted session token");
        }
        Self {
            token: Arc::new(RwLock::new(token)),
            storage,
        }
    }

    /// Store a token in memory and in persistent storage. An empty value
    /// counts as absent and clears the session instead.
    pub fn set_token(&self, value: &str) {
        if value.is_empty() {
            self.clear();
            return;
        }
        *self.token.write().unwrap() = Some(value.to_string());
        self.storage.set(TOKEN_STORAGE_KEY, value);
    }

    /// Drop the token from memory and from persistent storage
    pub fn clear(&self) {
        *self.token.write().unwrap() = None;
        self.storage.remove(TOKEN_STORAGE_KEY);
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;

    #[test]
    fn test_starts_unauthenticated_with_empty_storage() {
        let session = SessionStore::open(Arc::new(MemoryStorage::new()));
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_set_token_persists_and_authenticates() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::open(storage.clone());

        session.set_token("jwt-value");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("jwt-value".to_string()));
        assert_eq!(storage.get(TOKEN_STORAGE_KEY), Some("jwt-value".to_string()));
    }

    #[test]
    fn test_open_restores_persisted_token() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_STORAGE_KEY, "persisted");

        let session = SessionStore::open(storage);
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("persisted".to_string()));
    }

    #[test]
    fn test_clear_removes_both_copies() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::open(storage.clone());

        session.set_token("jwt-value");
        session.clear();

        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(storage.get(TOKEN_STORAGE_KEY), None);
    }

    #[test]
    fn test_empty_persisted_token_is_ignored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_STORAGE_KEY, "");

        let session = SessionStore::open(storage);
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_set_empty_token_clears_session() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::open(storage.clone());
        session.set_token("jwt-value");

        session.set_token("");

        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(storage.get(TOKEN_STORAGE_KEY), None);
    }
}
