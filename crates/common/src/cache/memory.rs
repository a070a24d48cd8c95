//! In-process cache store.

use super::{CacheError, CacheStore, glob_match};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Cache store kept in a concurrent map. Expired entries are dropped lazily.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.expires_at > now).count()
    }

    /// Whether the store holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, e| e.expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64, CacheError> {
        Ok(u64::from(self.entries.remove(key).is_some()))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let before = self.entries.len();
        self.entries.retain(|key, _| !glob_match(pattern, key));
        Ok((before - self.entries.len()) as u64)
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let store = MemoryStore::new();
        store
            .set("k", "v".to_string(), Duration::from_millis(0))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_pattern_counts_removed_keys() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        store.set("like:a", "1".into(), ttl).await.unwrap();
        store.set("like:b", "1".into(), ttl).await.unwrap();
        store.set("user:info:1", "1".into(), ttl).await.unwrap();

        assert_eq!(store.delete_pattern("like:*").await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.delete("user:info:1").await.unwrap(), 1);
        assert_eq!(store.delete("user:info:1").await.unwrap(), 0);
    }
}
