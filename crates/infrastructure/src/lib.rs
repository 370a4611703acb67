//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: cache backends, the
//! bridge from upstream weather providers to weather sources, and the
//! built-in statistical forecast model. Also owns configuration loading,
//! logging setup and the wiring that assembles a `WeatherService`.

pub mod adapters;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::build_weather_service;
pub use cache::{CacheBackend, MemoryCache, MokaCache, MokaCacheConfig, create_cache};
pub use config::{AppConfig, CacheConfig, ConfigError, Environment, PredictionConfig};
pub use telemetry::{LoggingConfig, TelemetryError, init_logging};
