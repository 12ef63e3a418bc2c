//! Long-lived translation cache.
//!
//! Entries are keyed by `translations.{locale}.{group}` and never expire on
//! time; they are dropped through [`CacheStore::forget`] or, in-process,
//! when more groups are cached than the configured capacity. Deploys are
//! expected to bust the cache.

mod memory;
mod tiered;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::Client as RedisClient;
use tracing::info;

pub use memory::MemoryCache;
pub use tiered::{CacheStats, TieredCache};

use crate::config::TranslatorConfig;
use crate::lines::LoadedLines;

/// Deferred computation of lines on a cache miss.
pub type ComputeLines<'a> = Pin<Box<dyn Future<Output = Result<LoadedLines>> + Send + 'a>>;

/// Compute-and-cache-indefinitely store.
///
/// Concurrent callers with the same key may both compute; the last writer
/// wins. Lines are a pure function of (locale, group) so either value is
/// acceptable.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the cached lines for `key`, computing and storing them on a miss.
    ///
    /// "Forever" means no time-based expiry. Bounded implementations may
    /// still evict under capacity pressure, after which the next call
    /// computes again.
    ///
    /// Errors from `compute` are returned unchanged and nothing is stored.
    async fn remember_forever<'a>(&self, key: &str, compute: ComputeLines<'a>)
    -> Result<LoadedLines>;

    /// Drop a cached entry.
    async fn forget(&self, key: &str) -> Result<()>;
}

/// Build the cache key for a default-namespace group.
pub fn cache_key(locale: &str, group: &str) -> String {
    format!("translations.{locale}.{group}")
}

/// Create the cache for this instance.
///
/// Two-tier (Moka + Redis) when a Redis URL is configured, in-process
/// only otherwise. A configured Redis must answer PING.
pub async fn from_config(config: &TranslatorConfig) -> Result<Arc<dyn CacheStore>> {
    let Some(url) = config.redis_url.as_deref() else {
        info!("translation cache: in-process only");
        return Ok(Arc::new(MemoryCache::with_capacity(config.cache_capacity)));
    };

    let redis = RedisClient::open(url).context("failed to create Redis client")?;

    let mut conn = redis
        .get_multiplexed_async_connection()
        .await
        .context("failed to connect to Redis")?;

    redis::cmd("PING")
        .query_async::<String>(&mut conn)
        .await
        .context("Redis PING failed")?;

    info!("translation cache: Moka L1 + Redis L2");
    Ok(Arc::new(TieredCache::with_capacity(redis, config.cache_capacity)))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_format() {
        assert_eq!(cache_key("en", "messages"), "translations.en.messages");
        assert_eq!(cache_key("pt-br", ""), "translations.pt-br.");
    }

    #[tokio::test]
    async fn without_redis_url_uses_memory_cache() {
        let cache = from_config(&TranslatorConfig::default()).await.unwrap();
        let lines = cache
            .remember_forever(
                "translations.en.messages",
                Box::pin(async { Ok::<_, anyhow::Error>(LoadedLines::from_pairs([("hi", "Hi")])) }),
            )
            .await
            .unwrap();
        assert_eq!(lines.text("hi"), Some("Hi"));
    }

    #[tokio::test]
    async fn unreachable_redis_is_a_startup_error() {
        let config = TranslatorConfig {
            redis_url: Some("redis://127.0.0.1:1".to_string()),
            ..TranslatorConfig::default()
        };
        assert!(from_config(&config).await.is_err());
    }
}
