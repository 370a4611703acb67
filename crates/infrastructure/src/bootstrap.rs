//! Service wiring
//!
//! Turns a validated [`AppConfig`] into a ready [`WeatherService`].

use std::{sync::Arc, time::Duration};

use application::{FallbackOrchestrator, PredictionEngine, WeatherService};
use integration_weather::ProviderRegistry;
use tracing::info;

use crate::{
    adapters::{StatisticalModelLoader, WeatherAdapter},
    cache::create_cache,
    config::{AppConfig, ConfigError},
};

/// Validate `config` and assemble the weather service
///
/// # Errors
///
/// Returns the validation error, `ConfigError::ProviderInit` when an HTTP
/// client cannot be built, or `ConfigError::NoProvidersConfigured` when the
/// priority list leaves no usable provider.
pub fn build_weather_service(config: &AppConfig) -> Result<WeatherService, ConfigError> {
    config.validate()?;

    let priority = config.providers.priority_ids()?;
    let registry = ProviderRegistry::build(
        &priority,
        &config.providers.integration_configs(),
        config.simulation.enabled,
    )?;
    if registry.is_empty() {
        return Err(ConfigError::NoProvidersConfigured);
    }
    let chain = registry.ids();

    let orchestrator = FallbackOrchestrator::new(WeatherAdapter::wrap_all(
        registry.into_providers(),
    ))
    .with_attempt_timeout(Duration::from_secs(config.providers.attempt_timeout_secs));

    let cache = create_cache(
        config.cache.backend,
        config.cache.purge_threshold,
        config.cache.max_capacity_mb,
    );

    let loader = Arc::new(StatisticalModelLoader::new(config.prediction.model()));
    let prediction =
        PredictionEngine::new(loader).with_history_hours(config.prediction.history_hours);

    info!(
        providers = ?chain,
        cache = %config.cache.backend,
        model = %config.prediction.model_version,
        "Weather service ready"
    );

    Ok(WeatherService::with_settings(
        orchestrator,
        cache,
        prediction,
        config.cache.ttls(),
        config.cache.coordinate_precision,
    ))
}
