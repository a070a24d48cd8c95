//! Cache facade.
//!
//! [`Cache`] is the only cache handle services see. It wraps a [`CacheStore`]
//! (Redis in production, [`MemoryStore`] in tests and single-node setups) and
//! adds JSON encoding, TTL policy and idempotency markers on top of it.
//!
//! Every facade method is best-effort: store failures are logged and turned
//! into a miss or a no-op, so the cache can never abort a database write.
//!
//! # Example
//!
//! ```ignore
//! let cache = Cache::new(RedisStore::connect(&config.redis).await?, &config.cache);
//!
//! if let Some(hit) = cache.check_idempotent::<ToggleOutcome>(user_id, "toggle_like", &[&kind, &target_id]).await {
//!     return Ok(hit);
//! }
//! // ... do the work ...
//! cache.delete_pattern("like:*").await;
//! cache.set_idempotent_result(user_id, "toggle_like", &outcome, &[&kind, &target_id]).await;
//! ```

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use crate::config::CacheConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Prefix of every idempotency marker.
pub const IDEMPOTENT_PREFIX: &str = "idempotent";

/// Raw key-value storage behind the facade.
///
/// Keys are plain strings; patterns use `*` as the only wildcard.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value that expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a single key. Returns the number of keys removed.
    async fn delete(&self, key: &str) -> Result<u64, CacheError>;

    /// Remove every key matching `pattern`. Returns the number of keys removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<(), CacheError>;
}

/// Cache error type. Never crosses the facade boundary.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Redis operation failed.
    #[error("Redis error: {0}")]
    Redis(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Injected cache client shared by all services.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    detail_ttl: Duration,
    list_ttl: Duration,
    idempotency_ttl: Duration,
}

impl Cache {
    /// Create a facade over `store` with the configured TTLs.
    #[must_use]
    pub fn new<S: CacheStore + 'static>(store: S, config: &CacheConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    /// Create a facade over an already shared store.
    #[must_use]
    pub fn from_arc(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            detail_ttl: config.detail_ttl(),
            list_ttl: config.list_ttl(),
            idempotency_ttl: config.idempotency_ttl(),
        }
    }

    /// In-memory cache with default TTLs.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MemoryStore::new(), &CacheConfig::default())
    }

    /// TTL for single-entity entries.
    #[must_use]
    pub const fn detail_ttl(&self) -> Duration {
        self.detail_ttl
    }

    /// TTL for list entries.
    #[must_use]
    pub const fn list_ttl(&self) -> Duration {
        self.list_ttl
    }

    /// Read and decode a cached value. Any failure is reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                self.delete(key).await;
                None
            }
        }
    }

    /// Encode and store a value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache value is not serializable");
                return;
            }
        };

        if let Err(e) = self.store.set(key, raw, ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    /// Remove a single key.
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!(key = %key, error = %e, "Cache delete failed");
        }
    }

    /// Remove every key matching `pattern`, e.g. `favorite:*`.
    pub async fn delete_pattern(&self, pattern: &str) {
        match self.store.delete_pattern(pattern).await {
            Ok(removed) => debug!(pattern = %pattern, removed, "Invalidated cache keys"),
            Err(e) => warn!(pattern = %pattern, error = %e, "Cache pattern delete failed"),
        }
    }

    /// Remove every key matching any of `patterns`.
    pub async fn delete_patterns(&self, patterns: &[&str]) {
        for pattern in patterns {
            self.delete_pattern(pattern).await;
        }
    }

    /// Build the idempotency key for `(user_id, action, args...)`.
    #[must_use]
    pub fn idempotency_key(&self, user_id: i64, action: &str, args: &[&(dyn Display + Sync)]) -> String {
        let mut key = format!("{IDEMPOTENT_PREFIX}:{user_id}:{action}");
        for arg in args {
            key.push(':');
            key.push_str(&arg.to_string());
        }
        key
    }

    /// Return the outcome a previous identical request stored, if it is still live.
    pub async fn check_idempotent<T: DeserializeOwned>(
        &self,
        user_id: i64,
        action: &str,
        args: &[&(dyn Display + Sync)],
    ) -> Option<T> {
        let key = self.idempotency_key(user_id, action, args);
        let hit = self.get(&key).await;
        if hit.is_some() {
            debug!(user_id, action = %action, "Replaying idempotent result");
        }
        hit
    }

    /// Record the outcome of a request so identical retries replay it.
    pub async fn set_idempotent_result<T: Serialize + ?Sized>(
        &self,
        user_id: i64,
        action: &str,
        result: &T,
        args: &[&(dyn Display + Sync)],
    ) {
        let key = self.idempotency_key(user_id, action, args);
        self.set(&key, result, self.idempotency_ttl).await;
    }

    /// Close the underlying store.
    pub async fn close(&self) {
        if let Err(e) = self.store.close().await {
            warn!(error = %e, "Failed to close cache store");
        }
    }
}

/// Build a cache key from a namespace and parts, e.g. `user:info:7`.
#[must_use]
pub fn build_key(namespace: &str, parts: &[&dyn Display]) -> String {
    let mut key = namespace.to_string();
    for part in parts {
        key.push(':');
        key.push_str(&part.to_string());
    }
    key
}

/// Glob matching with `*` as the only wildcard, as used by Redis `SCAN MATCH`.
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    let mut segments = pattern.split('*');
    let Some(first) = segments.next() else {
        return key.is_empty();
    };
    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };

    let tail: Vec<&str> = segments.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all.
        return rest.is_empty();
    };

    for segment in middle {
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Outcome {
        liked: bool,
        count: i64,
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("favorite:*", "favorite:list:1:abc"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("user:*:info", "user:7:info"));
        assert!(glob_match("user:info:7", "user:info:7"));
        assert!(!glob_match("user:info:7", "user:info:70"));
        assert!(!glob_match("like:*", "favorite:list"));
        assert!(!glob_match("a*b*c", "a-c-b"));
    }

    #[test]
    fn test_build_key() {
        assert_eq!(build_key("user:info", &[&7]), "user:info:7");
        assert_eq!(build_key("category:tree", &[]), "category:tree");
    }

    #[test]
    fn test_idempotency_key_layout() {
        let cache = Cache::memory();
        let key = cache.idempotency_key(1, "toggle_favorite", &[&"CONTENT", &42]);
        assert_eq!(key, "idempotent:1:toggle_favorite:CONTENT:42");
    }

    #[tokio::test]
    async fn test_idempotent_round_trip() {
        let cache = Cache::memory();
        let outcome = Outcome {
            liked: true,
            count: 3,
        };

        let miss: Option<Outcome> = cache.check_idempotent(1, "toggle_like", &[&"CONTENT", &5]).await;
        assert!(miss.is_none());

        cache
            .set_idempotent_result(1, "toggle_like", &outcome, &[&"CONTENT", &5])
            .await;

        let hit: Option<Outcome> = cache.check_idempotent(1, "toggle_like", &[&"CONTENT", &5]).await;
        assert_eq!(hit, Some(outcome));

        // A different target does not replay.
        let other: Option<Outcome> = cache.check_idempotent(1, "toggle_like", &[&"CONTENT", &6]).await;
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_delete_pattern_clears_family() {
        let cache = Cache::memory();
        let ttl = Duration::from_secs(60);
        cache.set("favorite:list:1:a", &1, ttl).await;
        cache.set("favorite:list:2:b", &2, ttl).await;
        cache.set("content:info:9", &3, ttl).await;

        cache.delete_pattern("favorite:*").await;

        assert_eq!(cache.get::<i32>("favorite:list:1:a").await, None);
        assert_eq!(cache.get::<i32>("favorite:list:2:b").await, None);
        assert_eq!(cache.get::<i32>("content:info:9").await, Some(3));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("user:info:1", "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let cache = Cache::from_arc(store.clone(), &CacheConfig::default());

        assert_eq!(cache.get::<Outcome>("user:info:1").await, None);
        assert_eq!(store.get("user:info:1").await.unwrap(), None);
    }
}
