//! Forecast model configuration.

use application::DEFAULT_HISTORY_HOURS;
use serde::{Deserialize, Serialize};

use crate::adapters::{
    PrecipitationCoefficients, STATISTICAL_MODEL_VERSION, StatisticalForecastModel,
    TemperatureCoefficients,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Version tag recorded on every prediction
    #[serde(default = "default_model_version")]
    pub model_version: String,

    /// Hours of history requested for each prediction (default: 48)
    #[serde(default = "default_history_hours")]
    pub history_hours: u32,

    #[serde(default)]
    pub temperature: TemperatureCoefficients,

    #[serde(default)]
    pub precipitation: PrecipitationCoefficients,
}

fn default_model_version() -> String {
    STATISTICAL_MODEL_VERSION.to_string()
}

const fn default_history_hours() -> u32 {
    DEFAULT_HISTORY_HOURS
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            model_version: default_model_version(),
            history_hours: default_history_hours(),
            temperature: TemperatureCoefficients::default(),
            precipitation: PrecipitationCoefficients::default(),
        }
    }
}

impl PredictionConfig {
    #[must_use]
    pub fn model(&self) -> StatisticalForecastModel {
        StatisticalForecastModel::new(
            self.model_version.clone(),
            self.temperature,
            self.precipitation,
        )
    }
}
