//! Application layer - Use cases and orchestration
//!
//! Defines the ports the engine talks through (weather sources, cache,
//! forecast models) and the services that orchestrate them: provider
//! fallback, single-flight cache fills, agronomic derivation and
//! short-horizon prediction.

pub mod deadline;
pub mod error;
pub mod outcome;
pub mod ports;
pub mod services;

pub use deadline::Deadline;
pub use error::ApplicationError;
pub use outcome::{FailureKind, ProviderFailure, UnavailableReason, WeatherOutcome};
pub use ports::*;
pub use services::*;
