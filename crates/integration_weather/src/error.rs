//! Error types for weather provider adapters

use thiserror::Error;

/// Errors that can occur while talking to an upstream weather provider
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request failed with an unexpected status or transport error
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request timed out at the HTTP client
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Provider answered with a 5xx status
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    /// API key rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Payload could not be decoded or normalized
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The provider does not offer this operation
    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

impl WeatherError {
    /// Whether the provider could not deliver an answer at all
    #[must_use]
    pub const fn is_provider_unavailable(&self) -> bool {
        !self.is_parse_error()
    }

    /// Whether the provider answered with a payload we could not use
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }

    /// Whether a later attempt could succeed without any change on our side
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout { .. }
                | Self::ServiceUnavailable(_)
                | Self::RateLimitExceeded { .. }
        )
    }
}

impl From<domain::DomainError> for WeatherError {
    fn from(err: domain::DomainError) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
