//! Cache port definition
//!
//! Time-boxed memoization of provider answers. Implementations live in
//! process memory; nothing is persisted.

use std::time::Duration;

use async_trait::async_trait;
use domain::WeatherOperation;

use crate::error::ApplicationError;

/// Byte-level cache keyed by operation, rounded location and parameters
///
/// An entry is a hit while `now - written < ttl`. Writes replace the whole
/// entry. Expired entries may linger until the backend purges them but are
/// never returned.
#[async_trait]
pub trait CachePort: Send + Sync + std::fmt::Debug {
    /// Get a cached value by key
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, ApplicationError>;

    /// Store a value with a time-to-live, replacing any previous entry
    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), ApplicationError>;

    /// Invalidate (delete) a single cache entry
    async fn invalidate(&self, key: &str) -> Result<(), ApplicationError>;

    /// Invalidate every entry whose key starts with `prefix`
    ///
    /// Returns the number of entries removed.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, ApplicationError>;

    /// Check if an unexpired entry exists (without counting a hit or miss)
    async fn exists(&self, key: &str) -> Result<bool, ApplicationError>;

    /// Get cache statistics (hits, misses, size)
    fn stats(&self) -> CacheStats;
}

/// Extension trait for typed cache operations
///
/// Provides convenient typed get/set methods on top of the raw byte interface.
#[async_trait]
pub trait CachePortExt: CachePort {
    /// Get a typed value from cache
    async fn get<T>(&self, key: &str) -> Result<Option<T>, ApplicationError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        match self.get_bytes(key).await? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes).map_err(|e| {
                    ApplicationError::Cache(format!("Cache deserialization error: {e}"))
                })?;
                Ok(Some(value))
            },
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), ApplicationError>
    where
        T: serde::Serialize + Send + Sync,
    {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| ApplicationError::Cache(format!("Cache serialization error: {e}")))?;
        self.set_bytes(key, bytes, ttl).await
    }
}

// Blanket implementation for all CachePort implementors
impl<T: CachePort + ?Sized> CachePortExt for T {}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Current number of entries
    pub entries: u64,
    /// Approximate memory usage in bytes
    pub memory_bytes: u64,
}

impl CacheStats {
    /// Calculate the hit rate as a percentage (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            // Precision loss is acceptable for statistics display
            self.hits as f64 / total as f64
        }
    }
}

/// Standard TTL values per weather operation
pub mod ttl {
    use std::time::Duration;

    /// Current conditions (5 minutes)
    pub const CURRENT: Duration = Duration::from_secs(5 * 60);

    /// Extended forecasts (30 minutes)
    pub const EXTENDED: Duration = Duration::from_secs(30 * 60);

    /// Historical observations (24 hours)
    pub const HISTORICAL: Duration = Duration::from_secs(24 * 60 * 60);
}

/// TTL per weather operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub current: Duration,
    pub extended: Duration,
    pub historical: Duration,
}

impl CacheTtls {
    #[must_use]
    pub const fn for_operation(&self, operation: WeatherOperation) -> Duration {
        match operation {
            WeatherOperation::Current => self.current,
            WeatherOperation::Extended => self.extended,
            WeatherOperation::Historical => self.historical,
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            current: ttl::CURRENT,
            extended: ttl::EXTENDED,
            historical: ttl::HISTORICAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_stats_hit_rate_zero_when_empty() {
        let stats = CacheStats::default();
        assert!(stats.hit_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn cache_stats_hit_rate_calculates_correctly() {
        let stats = CacheStats {
            hits: 75,
            misses: 25,
            entries: 100,
            memory_bytes: 1024,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn cache_stats_hit_rate_all_hits() {
        let stats = CacheStats {
            hits: 100,
            misses: 0,
            entries: 50,
            memory_bytes: 512,
        };
        assert!((stats.hit_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cache_stats_hit_rate_all_misses() {
        let stats = CacheStats {
            hits: 0,
            misses: 100,
            entries: 0,
            memory_bytes: 0,
        };
        assert!(stats.hit_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn ttl_values_follow_operation_volatility() {
        assert_eq!(ttl::CURRENT, Duration::from_secs(300));
        assert_eq!(ttl::EXTENDED, Duration::from_secs(1800));
        assert_eq!(ttl::HISTORICAL, Duration::from_secs(86_400));
    }

    #[test]
    fn ttls_select_by_operation() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.for_operation(WeatherOperation::Current), ttl::CURRENT);
        assert_eq!(ttls.for_operation(WeatherOperation::Extended), ttl::EXTENDED);
        assert_eq!(
            ttls.for_operation(WeatherOperation::Historical),
            ttl::HISTORICAL
        );
    }
}
