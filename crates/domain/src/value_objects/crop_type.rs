//! Crop type value object

use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};

/// Crops with a known thermal profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Corn,
    Wheat,
    Rice,
    Soybean,
    Cotton,
    Potato,
    Tomato,
    Coffee,
    /// Any crop without a dedicated profile
    #[default]
    Other,
}

impl CropType {
    /// Every crop, in display order
    pub const ALL: [Self; 9] = [
        Self::Corn,
        Self::Wheat,
        Self::Rice,
        Self::Soybean,
        Self::Cotton,
        Self::Potato,
        Self::Tomato,
        Self::Coffee,
        Self::Other,
    ];

    /// Base temperature in Celsius below which the crop accrues no growing degree days
    #[must_use]
    pub const fn base_temperature(self) -> f64 {
        match self {
            Self::Cotton => 15.6,
            Self::Wheat => 4.4,
            Self::Potato => 7.0,
            Self::Corn | Self::Rice | Self::Soybean | Self::Tomato | Self::Coffee | Self::Other => {
                10.0
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Corn => "corn",
            Self::Wheat => "wheat",
            Self::Rice => "rice",
            Self::Soybean => "soybean",
            Self::Cotton => "cotton",
            Self::Potato => "potato",
            Self::Tomato => "tomato",
            Self::Coffee => "coffee",
            Self::Other => "other",
        }
    }
}

impl FromStr for CropType {
    type Err = Infallible;

    /// Parses case-insensitively; unknown names become `Other`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Ok(match normalized.as_str() {
            "corn" | "maize" => Self::Corn,
            "wheat" => Self::Wheat,
            "rice" => Self::Rice,
            "soybean" | "soy" | "soybeans" => Self::Soybean,
            "cotton" => Self::Cotton,
            "potato" | "potatoes" => Self::Potato,
            "tomato" | "tomatoes" => Self::Tomato,
            "coffee" => Self::Coffee,
            _ => Self::Other,
        })
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
