//! Short-horizon prediction output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, GeoLocation};

/// Predicted hourly values, one entry per horizon step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedMetrics {
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    /// Precipitation likelihood in `[0, 1]`
    pub precipitation_probability: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub pressure: Vec<f64>,
}

impl PredictedMetrics {
    fn lengths(&self) -> [usize; 5] {
        [
            self.temperature.len(),
            self.humidity.len(),
            self.precipitation_probability.len(),
            self.wind_speed.len(),
            self.pressure.len(),
        ]
    }
}

/// Multi-metric forecast extension with per-step confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBundle {
    location: GeoLocation,
    horizon_hours: usize,
    generated_at: DateTime<Utc>,
    metrics: PredictedMetrics,
    confidence: Vec<f64>,
    model_version: String,
    feature_names: Vec<String>,
}

impl PredictionBundle {
    /// Assemble a bundle whose every array spans exactly `horizon_hours`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if any metric or the confidence
    /// array has a different length, or the horizon is zero
    pub fn new(
        location: GeoLocation,
        generated_at: DateTime<Utc>,
        metrics: PredictedMetrics,
        confidence: Vec<f64>,
        model_version: impl Into<String>,
        feature_names: Vec<String>,
    ) -> Result<Self, DomainError> {
        let horizon_hours = confidence.len();
        if horizon_hours == 0 {
            return Err(DomainError::ValidationError(
                "prediction horizon must be at least one hour".to_string(),
            ));
        }
        if metrics.lengths().iter().any(|&len| len != horizon_hours) {
            return Err(DomainError::ValidationError(format!(
                "metric lengths {:?} do not match horizon {horizon_hours}",
                metrics.lengths()
            )));
        }
        Ok(Self {
            location,
            horizon_hours,
            generated_at,
            metrics,
            confidence,
            model_version: model_version.into(),
            feature_names,
        })
    }

    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        self.location
    }

    #[must_use]
    pub const fn horizon_hours(&self) -> usize {
        self.horizon_hours
    }

    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    #[must_use]
    pub const fn metrics(&self) -> &PredictedMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn confidence(&self) -> &[f64] {
        &self.confidence
    }

    #[must_use]
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
