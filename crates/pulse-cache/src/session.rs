//! Server-side storage for HTTP sessions.
//!
//! The browser only ever holds a signed session id; the data itself lives in
//! the configured [`CacheManager`] under `{key_prefix}{id}` and expires with
//! the cookie.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use pulse_core::config::session::SessionConfig;
use pulse_core::result::AppResult;
use pulse_core::traits::cache::CacheProvider;

use crate::keys;
use crate::provider::CacheManager;

/// Arbitrary JSON fields attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData(Map<String, Value>);

impl SessionData {
    /// Read a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Write a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }
}

/// Loads and persists [`SessionData`] by session id.
#[derive(Debug, Clone)]
pub struct SessionStore {
    cache: CacheManager,
    key_prefix: String,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store backed by `cache` using the session settings.
    pub fn new(cache: CacheManager, config: &SessionConfig) -> Self {
        Self {
            cache,
            key_prefix: config.key_prefix.clone(),
            ttl: Duration::from_secs(config.max_age_seconds),
        }
    }

    /// Generate a fresh, unguessable session id.
    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Load a session. Missing, expired and undecodable sessions yield `None`.
    pub async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>> {
        let key = keys::session(&self.key_prefix, session_id);
        let Some(raw) = self.cache.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                debug!(error = %e, "Discarding undecodable session");
                Ok(None)
            }
        }
    }

    /// Persist a session, resetting its expiry.
    pub async fn save(&self, session_id: &str, data: &SessionData) -> AppResult<()> {
        let key = keys::session(&self.key_prefix, session_id);
        let raw = serde_json::to_string(data)?;
        self.cache.set(&key, &raw, self.ttl).await
    }

    /// Extend an existing session's lifetime without rewriting it.
    pub async fn touch(&self, session_id: &str) -> AppResult<bool> {
        let key = keys::session(&self.key_prefix, session_id);
        self.cache.expire(&key, self.ttl).await
    }

    /// Remove a session.
    pub async fn destroy(&self, session_id: &str) -> AppResult<()> {
        let key = keys::session(&self.key_prefix, session_id);
        self.cache.delete(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::config::cache::CacheConfig;
    use serde_json::json;

    async fn make_store() -> SessionStore {
        let cache = CacheManager::new(&CacheConfig::default()).await.unwrap();
        SessionStore::new(cache, &SessionConfig::default())
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = make_store().await;
        let id = SessionStore::generate_id();
        let mut data = SessionData::default();
        data.insert("views", json!(3));

        store.save(&id, &data).await.unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.get("views"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_load_missing() {
        let store = make_store().await;
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = make_store().await;
        let id = SessionStore::generate_id();
        store.save(&id, &SessionData::default()).await.unwrap();
        store.destroy(&id).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_none());
        assert!(!store.touch(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_undecodable_session_is_discarded() {
        let cache = CacheManager::new(&CacheConfig::default()).await.unwrap();
        cache
            .set("session:bad", "not json", Duration::from_secs(60))
            .await
            .unwrap();
        let store = SessionStore::new(cache, &SessionConfig::default());
        assert!(store.load("bad").await.unwrap().is_none());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(SessionStore::generate_id(), SessionStore::generate_id());
    }
}
