//! Domain layer for AgriWeather
//!
//! Contains the canonical weather model, value objects, the agronomic
//! derivation library and the pure feature-window functions used by the
//! short-horizon prediction engine. This layer performs no I/O.

pub mod agronomy;
pub mod entities;
pub mod errors;
pub mod prediction;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
