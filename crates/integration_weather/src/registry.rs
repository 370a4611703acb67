//! Provider registry
//!
//! Turns a priority list plus per-provider settings into the ordered set of
//! adapters the fallback chain walks.

use std::{collections::HashMap, sync::Arc};

use domain::ProviderId;
use tracing::{debug, info};

use crate::{
    config::ProviderConfig, error::WeatherError, openweathermap::OpenWeatherMapProvider,
    provider::WeatherProvider, simulation::SimulationProvider, tomorrow_io::TomorrowIoProvider,
    visual_crossing::VisualCrossingProvider, weatherapi::WeatherApiProvider,
};

/// Create the adapter for one credentialed provider
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created, or
/// `WeatherError::Unsupported` for the simulation id, which takes no
/// credentials.
pub fn create_provider(
    id: ProviderId,
    config: ProviderConfig,
) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    Ok(match id {
        ProviderId::OpenWeatherMap => Arc::new(OpenWeatherMapProvider::new(config)?),
        ProviderId::WeatherApi => Arc::new(WeatherApiProvider::new(config)?),
        ProviderId::TomorrowIo => Arc::new(TomorrowIoProvider::new(config)?),
        ProviderId::VisualCrossing => Arc::new(VisualCrossingProvider::new(config)?),
        ProviderId::Simulation => {
            return Err(WeatherError::Unsupported(
                "the simulation provider takes no credentials".to_string(),
            ));
        },
    })
}

/// Ordered adapters, highest priority first
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn WeatherProvider>>,
}

impl ProviderRegistry {
    /// Build the chain in `priority` order
    ///
    /// Providers without settings or with an empty key are skipped, repeated
    /// ids count once, and the simulation provider is appended last when
    /// `simulation` is set regardless of where the priority list puts it.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created.
    pub fn build(
        priority: &[ProviderId],
        configs: &HashMap<ProviderId, ProviderConfig>,
        simulation: bool,
    ) -> Result<Self, WeatherError> {
        let mut providers: Vec<Arc<dyn WeatherProvider>> = Vec::new();
        let mut seen = Vec::with_capacity(priority.len());

        for &id in priority {
            if id.is_simulation() || seen.contains(&id) {
                continue;
            }
            seen.push(id);
            let Some(config) = configs.get(&id) else {
                debug!(provider = %id, "Provider not configured, skipping");
                continue;
            };
            if config.api_key.trim().is_empty() {
                debug!(provider = %id, "Provider has no API key, skipping");
                continue;
            }
            providers.push(create_provider(id, config.clone())?);
        }

        if simulation {
            providers.push(Arc::new(SimulationProvider::new()));
        }

        info!(
            providers = ?providers.iter().map(|p| p.id()).collect::<Vec<_>>(),
            "Weather provider chain built"
        );
        Ok(Self { providers })
    }

    #[must_use]
    pub fn into_providers(self) -> Vec<Arc<dyn WeatherProvider>> {
        self.providers
    }

    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configs(ids: &[ProviderId]) -> HashMap<ProviderId, ProviderConfig> {
        ids.iter()
            .map(|&id| (id, ProviderConfig::new(id, "key")))
            .collect()
    }

    #[test]
    fn follows_priority_order() {
        let registry = ProviderRegistry::build(
            &[ProviderId::VisualCrossing, ProviderId::OpenWeatherMap],
            &configs(&ProviderId::DEFAULT_PRIORITY),
            false,
        )
        .unwrap();
        assert_eq!(
            registry.ids(),
            vec![ProviderId::VisualCrossing, ProviderId::OpenWeatherMap]
        );
    }

    #[test]
    fn skips_unconfigured_and_keyless_providers() {
        let mut configs = configs(&[ProviderId::OpenWeatherMap, ProviderId::TomorrowIo]);
        configs.insert(
            ProviderId::WeatherApi,
            ProviderConfig::new(ProviderId::WeatherApi, "  "),
        );
        let registry =
            ProviderRegistry::build(&ProviderId::DEFAULT_PRIORITY, &configs, false).unwrap();
        assert_eq!(
            registry.ids(),
            vec![ProviderId::OpenWeatherMap, ProviderId::TomorrowIo]
        );
    }

    #[test]
    fn simulation_is_always_last() {
        let registry = ProviderRegistry::build(
            &[ProviderId::Simulation, ProviderId::WeatherApi],
            &configs(&[ProviderId::WeatherApi]),
            true,
        )
        .unwrap();
        assert_eq!(
            registry.ids(),
            vec![ProviderId::WeatherApi, ProviderId::Simulation]
        );
    }

    #[test]
    fn simulation_absent_unless_enabled() {
        let registry = ProviderRegistry::build(
            &[ProviderId::Simulation],
            &HashMap::new(),
            false,
        )
        .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_ids_count_once() {
        let registry = ProviderRegistry::build(
            &[ProviderId::WeatherApi, ProviderId::WeatherApi],
            &configs(&[ProviderId::WeatherApi]),
            false,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn simulation_has_no_credentialed_constructor() {
        let result = create_provider(
            ProviderId::Simulation,
            ProviderConfig::new(ProviderId::Simulation, "key"),
        );
        assert!(matches!(result, Err(WeatherError::Unsupported(_))));
    }
}
