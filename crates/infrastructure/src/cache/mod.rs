//! Cache implementations
//!
//! Both backends live in process memory and honour a per-entry TTL:
//! - `MemoryCache`: lock-protected map with lazy expiry, purged once it
//!   grows past a threshold
//! - `MokaCache`: size-bounded moka cache with per-entry expiry

mod memory_cache;
mod moka_cache;

use std::sync::Arc;

use application::ports::CachePort;
use serde::{Deserialize, Serialize};

pub use memory_cache::{DEFAULT_PURGE_THRESHOLD, MemoryCache};
pub use moka_cache::{MokaCache, MokaCacheConfig};

/// Which cache implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// [`MemoryCache`]
    #[default]
    Memory,
    /// [`MokaCache`]
    Moka,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Moka => write!(f, "moka"),
        }
    }
}

/// Build the selected backend
#[must_use]
pub fn create_cache(
    backend: CacheBackend,
    purge_threshold: usize,
    max_capacity_mb: u64,
) -> Arc<dyn CachePort> {
    match backend {
        CacheBackend::Memory => Arc::new(MemoryCache::with_purge_threshold(purge_threshold)),
        CacheBackend::Moka => Arc::new(MokaCache::with_config(MokaCacheConfig {
            max_capacity_mb,
        })),
    }
}
