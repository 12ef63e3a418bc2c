//! Two-tier translation cache with Moka (L1) and Redis (L2).
//!
//! Both tiers hold entries indefinitely. Redis is an accelerator shared
//! across instances, never the source of truth: when it is unreachable the
//! lines are computed and served from L1 only.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use redis::AsyncCommands;
use redis::Client as RedisClient;
use tracing::{debug, warn};

use super::{CacheStore, ComputeLines};
use crate::lines::LoadedLines;

/// Default maximum L1 cache capacity.
const L1_MAX_CAPACITY: u64 = 10_000;

/// Two-tier translation cache.
///
/// L1 (Moka): in-process, per-instance, bounded by capacity
/// L2 (Redis): shared across instances, no expiry
///
/// An entry evicted from L1 is refilled from L2 before computing.
#[derive(Clone)]
pub struct TieredCache {
    inner: Arc<TieredCacheInner>,
}

struct TieredCacheInner {
    /// L1 in-process cache.
    local: Cache<String, LoadedLines>,

    /// L2 Redis client.
    redis: RedisClient,
}

impl TieredCache {
    /// Create a new tiered cache.
    pub fn new(redis: RedisClient) -> Self {
        Self::with_capacity(redis, L1_MAX_CAPACITY)
    }

    /// Create a tiered cache holding at most `capacity` groups in L1.
    pub fn with_capacity(redis: RedisClient, capacity: u64) -> Self {
        let local = Cache::builder().max_capacity(capacity).build();

        Self {
            inner: Arc::new(TieredCacheInner { local, redis }),
        }
    }

    /// Read an entry from L2, treating any Redis or decode failure as a miss.
    async fn get_shared(&self, key: &str) -> Option<LoadedLines> {
        let mut conn = match self.inner.redis.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed to get Redis connection for translation cache");
                return None;
            }
        };

        let raw: Option<String> = match conn.get(key).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, key = %key, "failed to read translation cache from Redis");
                return None;
            }
        };

        match serde_json::from_str(&raw?) {
            Ok(lines) => Some(lines),
            Err(e) => {
                warn!(error = %e, key = %key, "discarding undecodable translation cache entry");
                None
            }
        }
    }

    /// Write an entry to L2 without expiry. Failures are logged only.
    async fn set_shared(&self, key: &str, lines: &LoadedLines) {
        let value = match serde_json::to_string(lines) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, key = %key, "failed to encode translation cache entry");
                return;
            }
        };

        let Ok(mut conn) = self.inner.redis.get_multiplexed_async_connection().await else {
            warn!("failed to get Redis connection for translation cache set");
            return;
        };

        if let Err(e) = conn.set::<_, _, ()>(key, value).await {
            warn!(error = %e, key = %key, "failed to set translation cache value in Redis");
        }
    }

    /// Get cache statistics (for monitoring).
    pub async fn stats(&self) -> CacheStats {
        self.inner.local.run_pending_tasks().await;
        CacheStats {
            l1_entry_count: self.inner.local.entry_count(),
        }
    }
}

#[async_trait]
impl CacheStore for TieredCache {
    async fn remember_forever<'a>(
        &self,
        key: &str,
        compute: ComputeLines<'a>,
    ) -> Result<LoadedLines> {
        if let Some(lines) = self.inner.local.get(key).await {
            debug!(key = %key, "translation cache L1 hit");
            return Ok(lines);
        }

        if let Some(lines) = self.get_shared(key).await {
            debug!(key = %key, "translation cache L2 hit, populating L1");
            self.inner.local.insert(key.to_string(), lines.clone()).await;
            return Ok(lines);
        }

        let lines = compute.await?;
        self.inner.local.insert(key.to_string(), lines.clone()).await;
        self.set_shared(key, &lines).await;
        debug!(key = %key, lines = lines.len(), "translation cache populated");
        Ok(lines)
    }

    async fn forget(&self, key: &str) -> Result<()> {
        self.inner.local.invalidate(key).await;

        let Ok(mut conn) = self.inner.redis.get_multiplexed_async_connection().await else {
            warn!("failed to get Redis connection for translation cache forget");
            return Ok(());
        };

        if let Err(e) = conn.del::<_, ()>(key).await {
            warn!(error = %e, key = %key, "failed to delete translation cache key from Redis");
        }

        debug!(key = %key, "translation cache entry forgotten");
        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of entries in L1 cache.
    pub l1_entry_count: u64,
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache").finish()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_creation() {
        // Opening a client does not connect; actual L2 tests require Redis.
        let client = RedisClient::open("redis://127.0.0.1:6379").unwrap();
        let cache = TieredCache::new(client);

        let stats = cache.stats().await;
        assert_eq!(stats.l1_entry_count, 0);
        assert_eq!(cache.inner.local.policy().max_capacity(), Some(L1_MAX_CAPACITY));
    }

    #[test]
    fn l1_capacity_is_configurable() {
        let client = RedisClient::open("redis://127.0.0.1:6379").unwrap();
        let cache = TieredCache::with_capacity(client, 42);
        assert_eq!(cache.inner.local.policy().max_capacity(), Some(42));
    }

    #[tokio::test]
    async fn unreachable_redis_degrades_to_compute() {
        // Port 1 is never a Redis server; every L2 call fails fast.
        let client = RedisClient::open("redis://127.0.0.1:1").unwrap();
        let cache = TieredCache::new(client);

        let lines = cache
            .remember_forever(
                "translations.en.messages",
                Box::pin(async { Ok::<_, anyhow::Error>(LoadedLines::from_pairs([("hello", "Hello")])) }),
            )
            .await
            .unwrap();
        assert_eq!(lines.text("hello"), Some("Hello"));

        // Served from L1 even though L2 is down.
        let again = cache
            .remember_forever(
                "translations.en.messages",
                Box::pin(async { Ok::<_, anyhow::Error>(LoadedLines::new()) }),
            )
            .await
            .unwrap();
        assert_eq!(again.text("hello"), Some("Hello"));
        assert_eq!(cache.stats().await.l1_entry_count, 1);
    }
}
