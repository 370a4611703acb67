//! Lazily expiring in-memory cache
//!
//! Expired entries stay in the map until a write pushes the map past the
//! purge threshold, at which point every expired entry is dropped in one
//! sweep. Reads never return an expired entry.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use application::{
    error::ApplicationError,
    ports::{CachePort, CacheStats},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Entry count above which a write triggers a purge of expired entries
pub const DEFAULT_PURGE_THRESHOLD: usize = 1000;

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    written: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.written) < self.ttl
    }
}

/// HashMap cache behind a read-write lock
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    purge_threshold: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.read().len())
            .field("purge_threshold", &self.purge_threshold)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_purge_threshold(DEFAULT_PURGE_THRESHOLD)
    }

    #[must_use]
    pub fn with_purge_threshold(purge_threshold: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            purge_threshold,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Entries held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every expired entry, returning how many went
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CachePort for MemoryCache {
    #[instrument(skip(self), level = "debug")]
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, ApplicationError> {
        let now = Instant::now();
        let value = self
            .entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone());

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
        }
        Ok(value)
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), ApplicationError> {
        let size = {
            let mut entries = self.entries.write();
            entries.insert(
                key.to_string(),
                Entry {
                    value,
                    written: Instant::now(),
                    ttl,
                },
            );
            entries.len()
        };
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");

        if size > self.purge_threshold {
            let removed = self.purge_expired();
            debug!(removed, "Purged expired cache entries");
        }
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn invalidate(&self, key: &str) -> Result<(), ApplicationError> {
        self.entries.write().remove(key);
        debug!(key = %key, "Cache invalidated");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, ApplicationError> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let count = (before - entries.len()) as u64;
        debug!(prefix = %prefix, count, "Prefix invalidation complete");
        Ok(count)
    }

    #[instrument(skip(self), level = "debug")]
    async fn exists(&self, key: &str) -> Result<bool, ApplicationError> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now)))
    }

    fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len() as u64,
            memory_bytes: entries
                .iter()
                .map(|(key, entry)| (key.len() + entry.value.len()) as u64)
                .sum(),
        }
    }
}
