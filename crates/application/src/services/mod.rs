//! Application services - Use case implementations

mod fallback_orchestrator;
mod prediction_engine;
mod single_flight;
#[cfg(test)]
pub(crate) mod test_support;
mod weather_service;

pub use fallback_orchestrator::{DEFAULT_ATTEMPT_TIMEOUT_SECS, FallbackOrchestrator, ProviderStatus};
pub use prediction_engine::{DEFAULT_HISTORY_HOURS, MAX_HORIZON_HOURS, PredictionEngine};
pub use single_flight::{FlightAborted, SingleFlight};
pub use weather_service::{
    AGRICULTURE_FORECAST_DAYS, DEFAULT_COORDINATE_PRECISION, MAX_FORECAST_DAYS, WeatherService,
};
