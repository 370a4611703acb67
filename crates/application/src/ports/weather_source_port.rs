//! Weather source port
//!
//! One implementation per upstream provider, selected by [`ProviderId`].

use async_trait::async_trait;
use domain::{ForecastBundle, ProviderId, WeatherOperation, WeatherQuery};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// A source of canonical weather data
///
/// Implementations report failures as `ApplicationError::ProviderUnavailable`
/// (transport and status) or `ApplicationError::Parse` (malformed payload).
/// They do not apply timeouts; the caller does.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherSourcePort: Send + Sync {
    fn provider_id(&self) -> ProviderId;

    /// Static weight attached to answers from this source
    fn reliability(&self) -> f64;

    /// Whether this source can serve the operation at all
    fn supports(&self, operation: WeatherOperation) -> bool;

    /// Fetch and normalize one query
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, ApplicationError>;
}
