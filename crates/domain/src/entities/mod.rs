//! Domain entities - the canonical weather model

mod agronomic_indices;
mod daily_aggregate;
mod forecast_bundle;
mod observation;
mod prediction_bundle;
mod weather_alert;

pub use agronomic_indices::{AgronomicIndices, IrrigationTier, Suitability};
pub use daily_aggregate::{DEFAULT_GDD_BASE, DailyAggregate};
pub use forecast_bundle::{ForecastBundle, LocationInfo};
pub use observation::{Observation, STANDARD_PRESSURE_HPA};
pub use prediction_bundle::{PredictedMetrics, PredictionBundle};
pub use weather_alert::{AlertSeverity, WeatherAlert};
