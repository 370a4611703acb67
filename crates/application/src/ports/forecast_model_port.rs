//! Forecast model ports
//!
//! A model turns feature windows into predictions. Evaluation is synchronous
//! and CPU-bound; callers move it off the async executor.

use std::sync::Arc;

use async_trait::async_trait;
use domain::prediction::FeatureSet;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// A loaded short-horizon model
#[cfg_attr(test, automock)]
pub trait ForecastModelPort: Send + Sync {
    /// Version tag recorded on every prediction
    fn version(&self) -> String;

    /// Hourly temperatures for the next `horizon` hours
    fn predict_temperature(
        &self,
        features: &FeatureSet,
        horizon: usize,
    ) -> Result<Vec<f64>, ApplicationError>;

    /// Likelihood of precipitation over the horizon, in `[0, 1]`
    fn predict_precipitation_probability(
        &self,
        features: &FeatureSet,
    ) -> Result<f64, ApplicationError>;
}

/// Loads a model once per process
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelLoaderPort: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ForecastModelPort>, ApplicationError>;
}
