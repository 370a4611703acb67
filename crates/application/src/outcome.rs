//! Tagged results for weather operations
//!
//! Provider exhaustion and missing history are expected outcomes, not
//! errors, so operations return [`WeatherOutcome`] instead of `Result`.

use domain::ProviderId;
use serde::{Deserialize, Serialize};

use crate::ApplicationError;

/// How a single provider attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection error or non-success status
    Unavailable,
    /// Payload could not be normalized
    Parse,
    /// The per-attempt timeout elapsed
    Timeout,
    /// Anything else the adapter reported
    Other,
}

/// Record of one failed provider attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub kind: FailureKind,
    pub message: String,
}

impl ProviderFailure {
    #[must_use]
    pub fn from_error(provider: ProviderId, error: &ApplicationError) -> Self {
        let kind = match error {
            ApplicationError::ProviderUnavailable { .. } => FailureKind::Unavailable,
            ApplicationError::Parse { .. } => FailureKind::Parse,
            _ => FailureKind::Other,
        };
        Self {
            provider,
            kind,
            message: error.to_string(),
        }
    }

    #[must_use]
    pub fn timeout(provider: ProviderId) -> Self {
        Self {
            provider,
            kind: FailureKind::Timeout,
            message: "attempt timed out".to_string(),
        }
    }
}

/// Why an operation produced no value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Every provider that supports the operation was tried and failed
    AllProvidersFailed { attempts: Vec<ProviderFailure> },
    /// No configured provider supports the operation
    NoProviderAttempted,
    /// The caller's deadline passed before an answer arrived
    DeadlineExceeded,
    /// Fewer contiguous hours of history than a prediction needs
    InsufficientHistory {
        available_hours: usize,
        required_hours: usize,
    },
    /// The forecast model failed to load or evaluate
    PredictionFailed { message: String },
    /// The engine itself failed, e.g. a fetch task panicked
    Internal { message: String },
}

/// Either a value or the reason there is none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum WeatherOutcome<T> {
    Available(T),
    Unavailable(UnavailableReason),
}

impl<T> WeatherOutcome<T> {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WeatherOutcome<U> {
        match self {
            Self::Available(value) => WeatherOutcome::Available(f(value)),
            Self::Unavailable(reason) => WeatherOutcome::Unavailable(reason),
        }
    }

    /// The value, if any
    pub fn available(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }

    #[must_use]
    pub const fn reason(&self) -> Option<&UnavailableReason> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }
}
