//! Built-in statistical forecast model
//!
//! Temperature follows the damped least-squares trend of the last day plus
//! the diurnal anomaly seen 24 hours earlier. Precipitation likelihood is a
//! logistic score over humidity, pressure tendency, cloud cover and recent
//! rain.

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{ForecastModelPort, ModelLoaderPort},
};
use async_trait::async_trait;
use domain::prediction::FeatureSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Version tag of the built-in model
pub const STATISTICAL_MODEL_VERSION: &str = "statistical-v1";

/// Length of one diurnal cycle in hourly steps
const DAY_HOURS: usize = 24;

/// Hours of trailing rain fed to the precipitation score
const RECENT_PRECIPITATION_HOURS: usize = 6;

/// Column of relative humidity in a precipitation feature row
const HUMIDITY_COLUMN: usize = 1;

/// Column of cloud cover in a precipitation feature row
const CLOUD_COVER_COLUMN: usize = 5;

/// Temperature model weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCoefficients {
    /// Fraction of the fitted hourly slope carried forward
    #[serde(default = "default_trend_damping")]
    pub trend_damping: f64,
    /// Weight of yesterday's anomaly from the daily mean
    #[serde(default = "default_diurnal_weight")]
    pub diurnal_weight: f64,
}

const fn default_trend_damping() -> f64 {
    0.5
}

const fn default_diurnal_weight() -> f64 {
    1.0
}

impl Default for TemperatureCoefficients {
    fn default() -> Self {
        Self {
            trend_damping: default_trend_damping(),
            diurnal_weight: default_diurnal_weight(),
        }
    }
}

/// Logistic weights for the precipitation score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationCoefficients {
    #[serde(default = "default_intercept")]
    pub intercept: f64,
    /// Per percent of mean relative humidity
    #[serde(default = "default_humidity")]
    pub humidity: f64,
    /// Per hPa of three-hour pressure change
    #[serde(default = "default_pressure_tendency")]
    pub pressure_tendency: f64,
    /// Per percent of mean cloud cover
    #[serde(default = "default_cloud_cover")]
    pub cloud_cover: f64,
    /// Per mm fallen over the last six hours
    #[serde(default = "default_recent_precipitation")]
    pub recent_precipitation: f64,
}

const fn default_intercept() -> f64 {
    -7.0
}

const fn default_humidity() -> f64 {
    0.06
}

const fn default_pressure_tendency() -> f64 {
    -0.9
}

const fn default_cloud_cover() -> f64 {
    0.025
}

const fn default_recent_precipitation() -> f64 {
    0.5
}

impl Default for PrecipitationCoefficients {
    fn default() -> Self {
        Self {
            intercept: default_intercept(),
            humidity: default_humidity(),
            pressure_tendency: default_pressure_tendency(),
            cloud_cover: default_cloud_cover(),
            recent_precipitation: default_recent_precipitation(),
        }
    }
}

/// Trend-plus-diurnal temperature and logistic precipitation model
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalForecastModel {
    version: String,
    temperature: TemperatureCoefficients,
    precipitation: PrecipitationCoefficients,
}

impl Default for StatisticalForecastModel {
    fn default() -> Self {
        Self::new(
            STATISTICAL_MODEL_VERSION,
            TemperatureCoefficients::default(),
            PrecipitationCoefficients::default(),
        )
    }
}

impl StatisticalForecastModel {
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        temperature: TemperatureCoefficients,
        precipitation: PrecipitationCoefficients,
    ) -> Self {
        Self {
            version: version.into(),
            temperature,
            precipitation,
        }
    }
}

/// Mean and least-squares slope (per step) of an evenly spaced series
fn mean_and_slope(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let x_mean = (n - 1.0) / 2.0;
    let (covariance, variance) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(cov, var), (i, y)| {
            let dx = i as f64 - x_mean;
            (dx.mul_add(y - mean, cov), dx.mul_add(dx, var))
        });
    let slope = if variance > 0.0 {
        covariance / variance
    } else {
        0.0
    };
    (mean, slope)
}

fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ForecastModelPort for StatisticalForecastModel {
    fn version(&self) -> String {
        self.version.clone()
    }

    fn predict_temperature(
        &self,
        features: &FeatureSet,
        horizon: usize,
    ) -> Result<Vec<f64>, ApplicationError> {
        let window = &features.temperature_window;
        if window.is_empty() {
            return Err(ApplicationError::Model(
                "temperature window is empty".to_string(),
            ));
        }
        let (mean, slope) = mean_and_slope(window);
        let cycle = window.len().min(DAY_HOURS);
        let cycle_start = window.len() - cycle;
        let trend = self.temperature.trend_damping * slope;

        Ok((1..=horizon)
            .map(|step| {
                let yesterday = window[cycle_start + (step - 1) % cycle];
                let anomaly = self.temperature.diurnal_weight * (yesterday - mean);
                trend.mul_add(step as f64, mean + anomaly)
            })
            .collect())
    }

    fn predict_precipitation_probability(
        &self,
        features: &FeatureSet,
    ) -> Result<f64, ApplicationError> {
        if features.precipitation_window.is_empty() {
            return Err(ApplicationError::Model(
                "precipitation window is empty".to_string(),
            ));
        }
        let c = &self.precipitation;
        let z = c.intercept
            + c.humidity * features.column_mean(HUMIDITY_COLUMN)
            + c.pressure_tendency * features.pressure_tendency
            + c.cloud_cover * features.column_mean(CLOUD_COVER_COLUMN)
            + c.recent_precipitation * features.recent_precipitation(RECENT_PRECIPITATION_HOURS);
        Ok(logistic(z).clamp(0.0, 1.0))
    }
}

/// Hands out the configured statistical model
#[derive(Debug, Clone, Default)]
pub struct StatisticalModelLoader {
    model: StatisticalForecastModel,
}

impl StatisticalModelLoader {
    #[must_use]
    pub const fn new(model: StatisticalForecastModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ModelLoaderPort for StatisticalModelLoader {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Arc<dyn ForecastModelPort>, ApplicationError> {
        if self.model.version.trim().is_empty() {
            return Err(ApplicationError::Model(
                "model version must not be empty".to_string(),
            ));
        }
        debug!(version = %self.model.version, "Loading statistical forecast model");
        Ok(Arc::new(self.model.clone()))
    }
}
