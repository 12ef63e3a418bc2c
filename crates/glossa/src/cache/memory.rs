//! In-process translation cache.

use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use super::{CacheStore, ComputeLines};
use crate::lines::LoadedLines;

/// Default maximum number of cached groups.
const MAX_CAPACITY: u64 = 10_000;

/// Moka-backed cache without TTL, for single-instance deployments and tests.
///
/// Holds at most `capacity` groups; past that Moka evicts the least used.
#[derive(Clone)]
pub struct MemoryCache {
    local: Cache<String, LoadedLines>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            local: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Whether an entry is currently cached.
    pub async fn contains(&self, key: &str) -> bool {
        self.local.get(key).await.is_some()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn remember_forever<'a>(
        &self,
        key: &str,
        compute: ComputeLines<'a>,
    ) -> Result<LoadedLines> {
        if let Some(lines) = self.local.get(key).await {
            debug!(key = %key, "translation cache hit");
            return Ok(lines);
        }

        let lines = compute.await?;
        self.local.insert(key.to_string(), lines.clone()).await;
        debug!(key = %key, lines = lines.len(), "translation cache populated");
        Ok(lines)
    }

    async fn forget(&self, key: &str) -> Result<()> {
        self.local.invalidate(key).await;
        debug!(key = %key, "translation cache entry forgotten");
        Ok(())
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.local.entry_count())
            .finish()
    }
}
