//! Moka in-memory cache implementation
//!
//! Size-bounded, thread-safe cache. Each entry carries its own TTL through
//! an [`Expiry`] policy, so current conditions and historical lookups can
//! share one cache.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use application::{
    error::ApplicationError,
    ports::{CachePort, CacheStats},
};
use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use tracing::{debug, instrument};

/// Maximum cache size in MB
const DEFAULT_MAX_CAPACITY_MB: u64 = 64;

/// Configuration for Moka cache
#[derive(Debug, Clone, Copy)]
pub struct MokaCacheConfig {
    /// Maximum capacity in megabytes, weighed by payload size
    pub max_capacity_mb: u64,
}

impl Default for MokaCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity_mb: DEFAULT_MAX_CAPACITY_MB,
        }
    }
}

#[derive(Debug, Clone)]
struct Stored {
    bytes: Vec<u8>,
    ttl: Duration,
}

/// Expires every entry `ttl` after its last write
struct WriteTtl;

impl Expiry<String, Stored> for WriteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Stored,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Stored,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-memory cache
pub struct MokaCache {
    cache: Cache<String, Stored>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for MokaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entries", &self.cache.entry_count())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl MokaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MokaCacheConfig::default())
    }

    #[must_use]
    pub fn with_config(config: MokaCacheConfig) -> Self {
        let max_capacity_bytes = config.max_capacity_mb * 1024 * 1024;

        let cache = Cache::builder()
            .max_capacity(max_capacity_bytes)
            .expire_after(WriteTtl)
            .weigher(|key: &String, value: &Stored| -> u32 {
                (key.len() + value.bytes.len())
                    .try_into()
                    .unwrap_or(u32::MAX)
            })
            .build();

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CachePort for MokaCache {
    #[instrument(skip(self), level = "debug")]
    #[allow(clippy::option_if_let_else)]
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, ApplicationError> {
        if let Some(stored) = self.cache.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
            Ok(Some(stored.bytes))
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
            Ok(None)
        }
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), ApplicationError> {
        self.cache
            .insert(key.to_string(), Stored { bytes: value, ttl })
            .await;
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn invalidate(&self, key: &str) -> Result<(), ApplicationError> {
        self.cache.invalidate(key).await;
        debug!(key = %key, "Cache invalidated");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, ApplicationError> {
        self.cache.run_pending_tasks().await;

        // Iterator yields (Arc<K>, V); keys are collected before touching the cache
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| (*k).clone())
            .collect();

        let mut count = 0u64;
        for key in keys_to_remove {
            self.cache.invalidate(&key).await;
            count += 1;
        }

        debug!(prefix = %prefix, count, "Prefix invalidation complete");
        Ok(count)
    }

    #[instrument(skip(self), level = "debug")]
    async fn exists(&self, key: &str) -> Result<bool, ApplicationError> {
        Ok(self.cache.contains_key(key))
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
            memory_bytes: self.cache.weighted_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_get() {
        let cache = MokaCache::new();
        cache
            .set_bytes("key1", b"value1".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        let result = cache.get_bytes("key1").await.unwrap();
        assert_eq!(result, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn get_nonexistent_counts_a_miss() {
        let cache = MokaCache::new();
        assert_eq!(cache.get_bytes("missing").await.unwrap(), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn entries_expire_independently() {
        let cache = MokaCache::new();
        cache
            .set_bytes("short", vec![1], Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_bytes("long", vec![2], Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get_bytes("short").await.unwrap(), None);
        assert_eq!(cache.get_bytes("long").await.unwrap(), Some(vec![2]));
    }

    #[tokio::test]
    async fn overwrite_replaces_value_and_ttl() {
        let cache = MokaCache::new();
        cache
            .set_bytes("k", vec![1], Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_bytes("k", vec![2], Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(cache.get_bytes("k").await.unwrap(), Some(vec![2]));
    }

    #[tokio::test]
    async fn invalidate_prefix_counts_removed_entries() {
        let cache = MokaCache::new();
        let ttl = Duration::from_secs(60);
        cache.set_bytes("current:1.00:2.00:", vec![1], ttl).await.unwrap();
        cache.set_bytes("current:1.00:2.00:x", vec![2], ttl).await.unwrap();
        cache.set_bytes("current:3.00:4.00:", vec![3], ttl).await.unwrap();

        let removed = cache.invalidate_prefix("current:1.00:2.00:").await.unwrap();
        assert_eq!(removed, 2);
        assert!(!cache.exists("current:1.00:2.00:").await.unwrap());
        assert!(cache.exists("current:3.00:4.00:").await.unwrap());
    }

    #[tokio::test]
    async fn invalidate_single_key() {
        let cache = MokaCache::new();
        cache
            .set_bytes("k", vec![1], Duration::from_secs(60))
            .await
            .unwrap();
        cache.invalidate("k").await.unwrap();
        assert_eq!(cache.get_bytes("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn hits_are_counted() {
        let cache = MokaCache::new();
        cache
            .set_bytes("k", vec![1], Duration::from_secs(60))
            .await
            .unwrap();
        let _ = cache.get_bytes("k").await.unwrap();
        let _ = cache.get_bytes("k").await.unwrap();
        assert_eq!(cache.stats().hits, 2);
    }
}
