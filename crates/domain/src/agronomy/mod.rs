//! Agronomic derivation library
//!
//! Pure functions from canonical weather values to agricultural indices.
//! Nothing here touches the network, the cache or provider state.

mod biotic;
mod daily;
mod suitability;
pub mod thermal;
mod water;

pub use biotic::{disease_pressure_index, pest_activity_index};
pub use daily::derive_indices;
pub use suitability::{
    harvest_score, harvest_suitability, planting_score, planting_suitability, spraying_score,
    spraying_suitability,
};
pub use thermal::{
    chill_hours, growing_degree_days, heat_index, heat_stress_hours, heat_stress_index,
    soil_temperature_estimate,
};
pub use water::{evapotranspiration, irrigation_recommendation, soil_moisture_index};
