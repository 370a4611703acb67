//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod statistical_model;
mod weather_adapter;

pub use statistical_model::{
    PrecipitationCoefficients, STATISTICAL_MODEL_VERSION, StatisticalForecastModel,
    StatisticalModelLoader, TemperatureCoefficients,
};
pub use weather_adapter::WeatherAdapter;
