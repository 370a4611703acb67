//! Upstream weather provider adapters
//!
//! One adapter per credentialed provider (OpenWeatherMap, WeatherAPI.com,
//! Tomorrow.io, Visual Crossing) plus a deterministic simulation source.
//! Each translates its provider's payload into the canonical domain model;
//! the [`ProviderRegistry`] assembles them in priority order.

pub mod conditions;
pub mod config;
pub mod error;
mod http;
pub mod openweathermap;
pub mod provider;
pub mod registry;
pub mod simulation;
pub mod tomorrow_io;
pub mod units;
pub mod visual_crossing;
pub mod weatherapi;

pub use config::{ProviderConfig, default_base_url};
pub use error::WeatherError;
pub use openweathermap::OpenWeatherMapProvider;
pub use provider::WeatherProvider;
pub use registry::{ProviderRegistry, create_provider};
pub use simulation::SimulationProvider;
pub use tomorrow_io::TomorrowIoProvider;
pub use visual_crossing::VisualCrossingProvider;
pub use weatherapi::WeatherApiProvider;
