//! Weather adapter - Implements WeatherSourcePort using integration_weather

use std::sync::Arc;

use application::{error::ApplicationError, ports::WeatherSourcePort};
use async_trait::async_trait;
use domain::{ForecastBundle, ProviderId, WeatherOperation, WeatherQuery};
use integration_weather::{WeatherError, WeatherProvider};
use tracing::{debug, instrument};

/// Exposes one upstream provider as an application weather source
pub struct WeatherAdapter {
    provider: Arc<dyn WeatherProvider>,
}

impl std::fmt::Debug for WeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAdapter")
            .field("provider", &self.provider.id())
            .finish()
    }
}

impl WeatherAdapter {
    #[must_use]
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Wrap every provider of a registry, keeping its order
    #[must_use]
    pub fn wrap_all(providers: Vec<Arc<dyn WeatherProvider>>) -> Vec<Arc<dyn WeatherSourcePort>> {
        providers
            .into_iter()
            .map(|provider| Arc::new(Self::new(provider)) as Arc<dyn WeatherSourcePort>)
            .collect()
    }

    /// Map integration weather error to application error
    ///
    /// Malformed payloads become `Parse`; everything else the provider can
    /// report means it could not serve the request.
    fn map_error(provider: ProviderId, err: &WeatherError) -> ApplicationError {
        if err.is_parse_error() {
            ApplicationError::Parse {
                provider,
                message: err.to_string(),
            }
        } else {
            ApplicationError::ProviderUnavailable {
                provider,
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl WeatherSourcePort for WeatherAdapter {
    fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    fn reliability(&self) -> f64 {
        self.provider.reliability()
    }

    fn supports(&self, operation: WeatherOperation) -> bool {
        self.provider.supports(operation)
    }

    #[instrument(skip(self, query), fields(provider = %self.provider.id(), operation = %query.operation()))]
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, ApplicationError> {
        let id = self.provider.id();
        match self.provider.fetch(query).await {
            Ok(bundle) => {
                debug!(
                    hourly = bundle.hourly().len(),
                    daily = bundle.daily().len(),
                    "Provider answered"
                );
                Ok(bundle)
            },
            Err(e) => {
                debug!(error = %e, "Provider request failed");
                Err(Self::map_error(id, &e))
            },
        }
    }
}
