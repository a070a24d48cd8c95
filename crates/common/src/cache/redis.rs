//! Redis-backed cache store.
//!
//! All keys are namespaced with the configured prefix, so `favorite:*` on a
//! store with prefix `plaza` scans `plaza:favorite:*`.

use super::{CacheError, CacheStore};
use crate::config::RedisConfig;
use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::{ClientLike, KeysInterface};
use fred::types::config::Config as RedisClientConfig;
use fred::types::{Expiration, Key};
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Keys deleted per `DEL` during pattern invalidation.
const DELETE_BATCH: usize = 500;

/// Cache store on top of a shared fred client.
#[derive(Clone)]
pub struct RedisStore {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisStore {
    /// Wrap an already connected client.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    /// Connect to the configured Redis server.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let client_config = RedisClientConfig::from_url(&config.url)
            .map_err(|e| CacheError::Redis(e.to_string()))?;
        let client = RedisClient::new(client_config, None, None, None);
        client.connect();
        client
            .wait_for_connect()
            .await
            .map_err(|e| CacheError::Redis(e.to_string()))?;

        info!(prefix = %config.prefix, "Connected to Redis cache");
        Ok(Self::new(Arc::new(client), config.prefix.clone()))
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.prefix)
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.redis
            .get::<Option<String>, _>(self.key(key))
            .await
            .map_err(|e| CacheError::Redis(e.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1);
        self.redis
            .set::<(), _, _>(self.key(key), value, Some(Expiration::EX(secs)), None, false)
            .await
            .map_err(|e| CacheError::Redis(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<u64, CacheError> {
        let removed: i64 = self
            .redis
            .del(self.key(key))
            .await
            .map_err(|e| CacheError::Redis(e.to_string()))?;
        Ok(removed.max(0) as u64)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let pattern = self.key(pattern);
        let keys: Vec<Key> = self
            .redis
            .scan_buffered(pattern.clone(), Some(100), None)
            .try_collect()
            .await
            .map_err(|e| CacheError::Redis(e.to_string()))?;

        let mut removed = 0u64;
        for batch in keys.chunks(DELETE_BATCH) {
            let count: i64 = self
                .redis
                .del(batch.to_vec())
                .await
                .map_err(|e| CacheError::Redis(e.to_string()))?;
            removed += count.max(0) as u64;
        }

        debug!(pattern = %pattern, removed, "Deleted Redis keys by pattern");
        Ok(removed)
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.redis
            .quit()
            .await
            .map_err(|e| CacheError::Redis(e.to_string()))?;
        info!("Closed Redis cache connection");
        Ok(())
    }
}
