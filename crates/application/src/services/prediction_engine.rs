//! Short-horizon prediction engine
//!
//! Builds feature windows from recent history, evaluates the loaded model on
//! the blocking pool and synthesizes the secondary metrics.

use std::{fmt, sync::Arc};

use chrono::Utc;
use domain::{
    GeoLocation, Observation, PredictedMetrics, PredictionBundle,
    prediction::{self, PRECIPITATION_FEATURES},
};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{ForecastModelPort, ModelLoaderPort},
};

/// Longest horizon a prediction may cover
pub const MAX_HORIZON_HOURS: usize = 48;

/// Hours of history requested for a prediction by default
pub const DEFAULT_HISTORY_HOURS: u32 = 48;

/// Evaluates a lazily loaded forecast model
pub struct PredictionEngine {
    loader: Arc<dyn ModelLoaderPort>,
    model: OnceCell<Arc<dyn ForecastModelPort>>,
    history_hours: u32,
}

impl fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("loaded", &self.model.initialized())
            .field("history_hours", &self.history_hours)
            .finish_non_exhaustive()
    }
}

impl PredictionEngine {
    #[must_use]
    pub fn new(loader: Arc<dyn ModelLoaderPort>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
            history_hours: DEFAULT_HISTORY_HOURS,
        }
    }

    /// Hours of history to request; never below the minimum a prediction needs
    #[must_use]
    pub fn with_history_hours(mut self, hours: u32) -> Self {
        let minimum = u32::try_from(prediction::MIN_HISTORY_HOURS).unwrap_or(u32::MAX);
        self.history_hours = hours.max(minimum);
        self
    }

    #[must_use]
    pub const fn history_hours(&self) -> u32 {
        self.history_hours
    }

    async fn model(&self) -> Result<Arc<dyn ForecastModelPort>, ApplicationError> {
        self.model
            .get_or_try_init(|| async {
                let model = self.loader.load().await?;
                debug!(version = %model.version(), "Forecast model loaded");
                Ok::<_, ApplicationError>(model)
            })
            .await
            .cloned()
    }

    /// Predict the next `horizon` hours from `history`
    ///
    /// # Errors
    ///
    /// `ApplicationError::InsufficientHistory` when fewer than 24 contiguous
    /// hours are available, `ApplicationError::Model` when the model fails or
    /// returns the wrong number of steps.
    #[instrument(skip(self, history), fields(lat = location.latitude(), lon = location.longitude(), history = history.len()))]
    pub async fn predict(
        &self,
        location: GeoLocation,
        history: &[Observation],
        horizon: usize,
    ) -> Result<PredictionBundle, ApplicationError> {
        let horizon = horizon.clamp(1, MAX_HORIZON_HOURS);
        let features = prediction::build_features(history)?;
        let model = self.model().await?;
        let version = model.version();

        let (features, temperatures, likelihood) = tokio::task::spawn_blocking(move || {
            let temperatures = model.predict_temperature(&features, horizon)?;
            let likelihood = model.predict_precipitation_probability(&features)?;
            Ok::<_, ApplicationError>((features, temperatures, likelihood))
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("prediction task failed: {e}")))??;

        if temperatures.len() != horizon {
            return Err(ApplicationError::Model(format!(
                "model returned {} temperature steps for a {horizon} hour horizon",
                temperatures.len()
            )));
        }

        let likelihood = if likelihood.is_nan() {
            0.0
        } else {
            likelihood.clamp(0.0, 1.0)
        };
        let secondary = prediction::synthesize_secondary(&features, &temperatures, likelihood);

        let metrics = PredictedMetrics {
            temperature: temperatures,
            humidity: secondary.humidity,
            precipitation_probability: vec![likelihood; horizon],
            wind_speed: secondary.wind_speed,
            pressure: secondary.pressure,
        };

        let bundle = PredictionBundle::new(
            location,
            Utc::now(),
            metrics,
            prediction::confidence_schedule(horizon),
            version,
            PRECIPITATION_FEATURES.iter().map(ToString::to_string).collect(),
        )?;
        debug!(horizon, "Prediction generated");
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockForecastModelPort, MockModelLoaderPort};
    use chrono::{Duration, TimeZone};
    use domain::ProviderId;

    fn history(hours: i64) -> Vec<Observation> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        (0..hours)
            .map(|h| {
                Observation::new(ProviderId::Simulation, start + Duration::hours(h), 15.0)
                    .with_humidity(70.0)
                    .with_pressure(1012.0)
                    .with_wind(3.0, 90.0)
            })
            .collect()
    }

    fn flat_model() -> MockForecastModelPort {
        let mut model = MockForecastModelPort::new();
        model.expect_version().return_const("test-v1".to_string());
        model
            .expect_predict_temperature()
            .returning(|features, horizon| Ok(vec![features.last_temperature; horizon]));
        model
            .expect_predict_precipitation_probability()
            .returning(|_| Ok(0.25));
        model
    }

    fn loader_once(model: MockForecastModelPort) -> MockModelLoaderPort {
        let model: Arc<dyn ForecastModelPort> = Arc::new(model);
        let mut loader = MockModelLoaderPort::new();
        loader
            .expect_load()
            .times(1)
            .returning(move || Ok(Arc::clone(&model)));
        loader
    }

    #[tokio::test]
    async fn prediction_spans_horizon_with_decaying_confidence() {
        let engine = PredictionEngine::new(Arc::new(loader_once(flat_model())));
        let location = GeoLocation::new(10.0, 10.0).unwrap();

        let bundle = engine.predict(location, &history(48), 12).await.unwrap();

        assert_eq!(bundle.horizon_hours(), 12);
        assert_eq!(bundle.model_version(), "test-v1");
        assert_eq!(bundle.metrics().temperature.len(), 12);
        assert!((bundle.confidence()[0] - 0.9).abs() < 1e-12);
        assert!(bundle.confidence().windows(2).all(|w| w[1] <= w[0]));
        assert!(bundle.confidence().iter().all(|&c| c >= 0.4));
        assert!(
            bundle
                .metrics()
                .precipitation_probability
                .iter()
                .all(|&p| (p - 0.25).abs() < 1e-12)
        );
        assert_eq!(bundle.feature_names().len(), 6);
    }

    #[tokio::test]
    async fn model_is_loaded_once() {
        let engine = PredictionEngine::new(Arc::new(loader_once(flat_model())));
        let location = GeoLocation::new(10.0, 10.0).unwrap();
        engine.predict(location, &history(30), 6).await.unwrap();
        engine.predict(location, &history(30), 6).await.unwrap();
    }

    #[tokio::test]
    async fn short_history_is_insufficient() {
        let mut loader = MockModelLoaderPort::new();
        loader.expect_load().never();
        let engine = PredictionEngine::new(Arc::new(loader));
        let location = GeoLocation::new(10.0, 10.0).unwrap();

        let err = engine.predict(location, &history(20), 12).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::InsufficientHistory {
                available_hours: 20,
                required_hours: 24
            }
        ));
    }

    #[tokio::test]
    async fn horizon_is_clamped() {
        let engine = PredictionEngine::new(Arc::new(loader_once(flat_model())));
        let location = GeoLocation::new(10.0, 10.0).unwrap();
        let bundle = engine.predict(location, &history(48), 500).await.unwrap();
        assert_eq!(bundle.horizon_hours(), MAX_HORIZON_HOURS);
        assert!((bundle.confidence()[47] - 0.4).abs() < 1e-12);
    }

    #[tokio::test]
    async fn wrong_step_count_is_a_model_error() {
        let mut model = MockForecastModelPort::new();
        model.expect_version().return_const("bad".to_string());
        model
            .expect_predict_temperature()
            .returning(|_, _| Ok(vec![1.0]));
        model
            .expect_predict_precipitation_probability()
            .returning(|_| Ok(0.5));
        let engine = PredictionEngine::new(Arc::new(loader_once(model)));
        let location = GeoLocation::new(10.0, 10.0).unwrap();

        let err = engine.predict(location, &history(48), 12).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Model(_)));
    }

    #[test]
    fn history_hours_has_a_floor() {
        let loader = MockModelLoaderPort::new();
        let engine = PredictionEngine::new(Arc::new(loader)).with_history_hours(6);
        assert_eq!(engine.history_hours(), 24);
    }
}
