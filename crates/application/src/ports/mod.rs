//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_port;
mod forecast_model_port;
mod weather_source_port;

pub use cache_port::{CachePort, CachePortExt, CacheStats, CacheTtls, ttl};
#[cfg(test)]
pub use forecast_model_port::{MockForecastModelPort, MockModelLoaderPort};
pub use forecast_model_port::{ForecastModelPort, ModelLoaderPort};
#[cfg(test)]
pub use weather_source_port::MockWeatherSourcePort;
pub use weather_source_port::WeatherSourcePort;
