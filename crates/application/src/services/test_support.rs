//! In-memory cache double for service tests

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::{
    error::ApplicationError,
    ports::{CachePort, CacheStats},
};

#[derive(Debug, Default)]
pub struct MemoryCacheDouble {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant, Duration)>>,
    stats: Mutex<CacheStats>,
}

impl MemoryCacheDouble {
    fn live(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|(_, written, ttl)| written.elapsed() < *ttl)
            .map(|(bytes, _, _)| bytes.clone())
    }
}

#[async_trait]
impl CachePort for MemoryCacheDouble {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, ApplicationError> {
        let value = self.live(key);
        let mut stats = self.stats.lock();
        if value.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(value)
    }

    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), ApplicationError> {
        self.entries
            .lock()
            .insert(key.to_string(), (value, Instant::now(), ttl));
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), ApplicationError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, ApplicationError> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn exists(&self, key: &str) -> Result<bool, ApplicationError> {
        Ok(self.live(key).is_some())
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.entries = self.entries.lock().len() as u64;
        stats
    }
}
