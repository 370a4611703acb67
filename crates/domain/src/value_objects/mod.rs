//! Value Objects - Immutable, identity-less domain primitives

mod crop_type;
mod geo_location;
mod provider_id;
mod weather_condition;
mod weather_query;

pub use crop_type::CropType;
pub use geo_location::GeoLocation;
pub use provider_id::ProviderId;
pub use weather_condition::WeatherCondition;
pub use weather_query::{HistoricalRange, WeatherOperation, WeatherQuery};
