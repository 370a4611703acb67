//! Weather provider trait

use async_trait::async_trait;
use domain::{ForecastBundle, ProviderId, WeatherOperation, WeatherQuery};
use std::fmt;

use crate::error::WeatherError;

/// An upstream weather source that answers in canonical form
///
/// Adapters translate units and vocabulary only. They never derive agronomic
/// values and never retry; fallback is the caller's job.
#[async_trait]
pub trait WeatherProvider: Send + Sync + fmt::Debug {
    /// Which provider this adapter talks to
    fn id(&self) -> ProviderId;

    /// Static weight of answers from this provider
    fn reliability(&self) -> f64 {
        self.id().reliability()
    }

    /// Whether the provider offers `operation` at all
    fn supports(&self, operation: WeatherOperation) -> bool;

    /// Fetch and normalize one query
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Unsupported` for operations outside
    /// [`supports`](Self::supports), a transport or status error when the
    /// provider cannot be reached, or `WeatherError::ParseError` when the
    /// payload cannot be normalized.
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, WeatherError>;
}

/// Fail early for an operation the provider does not offer
pub(crate) fn ensure_supported(
    provider: &dyn WeatherProvider,
    query: &WeatherQuery,
) -> Result<(), WeatherError> {
    let operation = query.operation();
    if provider.supports(operation) {
        Ok(())
    } else {
        Err(WeatherError::Unsupported(format!(
            "{} does not offer {operation} data",
            provider.id().display_name()
        )))
    }
}
