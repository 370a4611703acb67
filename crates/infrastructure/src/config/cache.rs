//! Cache configuration with TTL settings.

use std::time::Duration;

use application::{CacheTtls, DEFAULT_COORDINATE_PRECISION};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheBackend, DEFAULT_PURGE_THRESHOLD};

/// Cache configuration with TTL settings per operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend implementation (`memory` or `moka`)
    #[serde(default)]
    pub backend: CacheBackend,

    /// TTL for current conditions in seconds (default: 5 minutes)
    #[serde(default = "default_ttl_current")]
    pub ttl_current_secs: u64,

    /// TTL for extended forecasts in seconds (default: 30 minutes)
    #[serde(default = "default_ttl_extended")]
    pub ttl_extended_secs: u64,

    /// TTL for historical lookups in seconds (default: 24 hours)
    #[serde(default = "default_ttl_historical")]
    pub ttl_historical_secs: u64,

    /// Entry count above which the memory backend sweeps expired entries
    #[serde(default = "default_purge_threshold")]
    pub purge_threshold: usize,

    /// Capacity bound of the moka backend in megabytes
    #[serde(default = "default_max_capacity_mb")]
    pub max_capacity_mb: u64,

    /// Decimal places of latitude/longitude in cache keys
    #[serde(default = "default_coordinate_precision")]
    pub coordinate_precision: usize,
}

const fn default_ttl_current() -> u64 {
    5 * 60
}

const fn default_ttl_extended() -> u64 {
    30 * 60
}

const fn default_ttl_historical() -> u64 {
    24 * 60 * 60
}

const fn default_purge_threshold() -> usize {
    DEFAULT_PURGE_THRESHOLD
}

const fn default_max_capacity_mb() -> u64 {
    64
}

const fn default_coordinate_precision() -> usize {
    DEFAULT_COORDINATE_PRECISION
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            ttl_current_secs: default_ttl_current(),
            ttl_extended_secs: default_ttl_extended(),
            ttl_historical_secs: default_ttl_historical(),
            purge_threshold: default_purge_threshold(),
            max_capacity_mb: default_max_capacity_mb(),
            coordinate_precision: default_coordinate_precision(),
        }
    }
}

impl CacheConfig {
    /// TTLs as the weather service consumes them
    #[must_use]
    pub const fn ttls(&self) -> CacheTtls {
        CacheTtls {
            current: Duration::from_secs(self.ttl_current_secs),
            extended: Duration::from_secs(self.ttl_extended_secs),
            historical: Duration::from_secs(self.ttl_historical_secs),
        }
    }
}
