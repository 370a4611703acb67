//! Canonical weather condition

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-independent sky and precipitation condition
///
/// Providers keep their own condition text on the observation; this enum is
/// the common vocabulary the rest of the engine keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    LightRain,
    ModerateRain,
    HeavyRain,
    FreezingRain,
    Snow,
    Thunderstorm,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Map a WMO weather interpretation code (0-99)
    #[must_use]
    pub const fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51..=55 => Self::Drizzle,
            56 | 57 | 66 | 67 => Self::FreezingRain,
            61 | 80 => Self::LightRain,
            63 | 81 => Self::ModerateRain,
            65 | 82 => Self::HeavyRain,
            71..=77 | 85 | 86 => Self::Snow,
            95..=99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Short English description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::LightRain => "Light rain",
            Self::ModerateRain => "Moderate rain",
            Self::HeavyRain => "Heavy rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the condition involves falling precipitation
    #[must_use]
    pub const fn is_wet(self) -> bool {
        matches!(
            self,
            Self::Drizzle
                | Self::LightRain
                | Self::ModerateRain
                | Self::HeavyRain
                | Self::FreezingRain
                | Self::Snow
                | Self::Thunderstorm
        )
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_codes_map_to_conditions() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(48), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_wmo_code(65), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_wmo_code(96), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_wmo_code(42), WeatherCondition::Unknown);
    }

    #[test]
    fn wet_conditions() {
        assert!(WeatherCondition::Drizzle.is_wet());
        assert!(WeatherCondition::Snow.is_wet());
        assert!(!WeatherCondition::Overcast.is_wet());
        assert!(!WeatherCondition::Unknown.is_wet());
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(WeatherCondition::PartlyCloudy.to_string(), "Partly cloudy");
    }
}
