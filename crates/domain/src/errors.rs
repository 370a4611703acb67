//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Latitude or longitude out of range
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// A daily aggregate was built with min above max
    #[error("Invalid temperature range: min {min} is above max {max}")]
    InvalidTemperatureRange {
        /// Minimum temperature in Celsius
        min: f64,
        /// Maximum temperature in Celsius
        max: f64,
    },

    /// A historical range is empty, inverted or too long
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    /// Hourly observations are not strictly increasing in time
    #[error("Observations are not strictly ordered at index {index}")]
    UnorderedObservations {
        /// Index of the first out-of-order observation
        index: usize,
    },

    /// Unknown provider identifier
    #[error("Unknown weather provider: {0}")]
    UnknownProvider(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
