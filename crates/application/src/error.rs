//! Application-level errors

use domain::{DomainError, ProviderId};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Provider could not be reached, timed out or answered with a non-success status
    #[error("Provider {provider} unavailable: {message}")]
    ProviderUnavailable {
        /// Failing provider
        provider: ProviderId,
        /// Upstream detail
        message: String,
    },

    /// Provider answered but the payload could not be normalized
    #[error("Failed to parse response from {provider}: {message}")]
    Parse {
        /// Provider whose payload was malformed
        provider: ProviderId,
        /// What was missing or malformed
        message: String,
    },

    /// Not enough contiguous history to run a prediction
    #[error("Insufficient history: {available_hours} of {required_hours} hours")]
    InsufficientHistory {
        /// Contiguous hours found
        available_hours: usize,
        /// Hours required
        required_hours: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Forecast model failed to load or evaluate
    #[error("Model error: {0}")]
    Model(String),

    /// Cache backend error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<domain::prediction::InsufficientHistory> for ApplicationError {
    fn from(err: domain::prediction::InsufficientHistory) -> Self {
        Self::InsufficientHistory {
            available_hours: err.available_hours,
            required_hours: err.required_hours,
        }
    }
}
