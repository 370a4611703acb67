//! Provider condition codes to the canonical [`WeatherCondition`]

use domain::WeatherCondition;

/// OpenWeatherMap condition id (`weather[0].id`)
#[must_use]
pub const fn from_openweathermap(id: i64) -> WeatherCondition {
    match id {
        200..=299 => WeatherCondition::Thunderstorm,
        300..=399 => WeatherCondition::Drizzle,
        500 | 520 => WeatherCondition::LightRain,
        501 | 521 => WeatherCondition::ModerateRain,
        502..=504 | 522 | 531 => WeatherCondition::HeavyRain,
        511 | 611..=616 => WeatherCondition::FreezingRain,
        600..=699 => WeatherCondition::Snow,
        701 | 711 | 721 | 741 => WeatherCondition::Fog,
        800 => WeatherCondition::Clear,
        801 => WeatherCondition::MainlyClear,
        802 => WeatherCondition::PartlyCloudy,
        803 | 804 => WeatherCondition::Overcast,
        _ => WeatherCondition::Unknown,
    }
}

/// WeatherAPI.com condition code (`condition.code`)
#[must_use]
pub const fn from_weatherapi(code: i64) -> WeatherCondition {
    match code {
        1000 => WeatherCondition::Clear,
        1003 => WeatherCondition::PartlyCloudy,
        1006 | 1009 => WeatherCondition::Overcast,
        1030 | 1135 | 1147 => WeatherCondition::Fog,
        1150 | 1153 => WeatherCondition::Drizzle,
        1063 | 1180 | 1183 | 1240 => WeatherCondition::LightRain,
        1186 | 1189 | 1243 => WeatherCondition::ModerateRain,
        1192 | 1195 | 1246 => WeatherCondition::HeavyRain,
        1072 | 1168 | 1171 | 1198 | 1201 => WeatherCondition::FreezingRain,
        1066 | 1069 | 1114 | 1117 | 1204..=1237 | 1249..=1264 => WeatherCondition::Snow,
        1087 | 1273..=1282 => WeatherCondition::Thunderstorm,
        _ => WeatherCondition::Unknown,
    }
}

/// Tomorrow.io weather code (`values.weatherCode`)
#[must_use]
pub const fn from_tomorrow_io(code: i64) -> WeatherCondition {
    match code {
        1000 => WeatherCondition::Clear,
        1100 => WeatherCondition::MainlyClear,
        1101 => WeatherCondition::PartlyCloudy,
        1001 | 1102 => WeatherCondition::Overcast,
        2000 | 2100 => WeatherCondition::Fog,
        4000 => WeatherCondition::Drizzle,
        4200 => WeatherCondition::LightRain,
        4001 => WeatherCondition::ModerateRain,
        4201 => WeatherCondition::HeavyRain,
        6000 | 6001 | 6200 | 6201 => WeatherCondition::FreezingRain,
        5000 | 5001 | 5100 | 5101 | 7000 | 7101 | 7102 => WeatherCondition::Snow,
        8000 => WeatherCondition::Thunderstorm,
        _ => WeatherCondition::Unknown,
    }
}

/// Short text for a Tomorrow.io code, which carries no description of its own
#[must_use]
pub const fn tomorrow_io_text(code: i64) -> &'static str {
    match code {
        1000 => "Clear, Sunny",
        1100 => "Mostly Clear",
        1101 => "Partly Cloudy",
        1102 => "Mostly Cloudy",
        1001 => "Cloudy",
        2000 => "Fog",
        2100 => "Light Fog",
        4000 => "Drizzle",
        4001 => "Rain",
        4200 => "Light Rain",
        4201 => "Heavy Rain",
        5000 => "Snow",
        5001 => "Flurries",
        5100 => "Light Snow",
        5101 => "Heavy Snow",
        6000 => "Freezing Drizzle",
        6001 => "Freezing Rain",
        6200 => "Light Freezing Rain",
        6201 => "Heavy Freezing Rain",
        7000 | 7101 | 7102 => "Ice Pellets",
        8000 => "Thunderstorm",
        _ => "Unknown",
    }
}

/// Visual Crossing icon name (`icon`)
#[must_use]
pub fn from_visual_crossing_icon(icon: &str) -> WeatherCondition {
    match icon {
        "clear-day" | "clear-night" => WeatherCondition::Clear,
        "partly-cloudy-day" | "partly-cloudy-night" => WeatherCondition::PartlyCloudy,
        "cloudy" => WeatherCondition::Overcast,
        "fog" => WeatherCondition::Fog,
        "showers-day" | "showers-night" => WeatherCondition::LightRain,
        "rain" => WeatherCondition::ModerateRain,
        "hail" => WeatherCondition::HeavyRain,
        "sleet" => WeatherCondition::FreezingRain,
        "snow" | "snow-showers-day" | "snow-showers-night" => WeatherCondition::Snow,
        "thunder" | "thunder-rain" | "thunder-showers-day" | "thunder-showers-night" => {
            WeatherCondition::Thunderstorm
        },
        _ => WeatherCondition::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openweathermap_groups() {
        assert_eq!(from_openweathermap(211), WeatherCondition::Thunderstorm);
        assert_eq!(from_openweathermap(301), WeatherCondition::Drizzle);
        assert_eq!(from_openweathermap(502), WeatherCondition::HeavyRain);
        assert_eq!(from_openweathermap(511), WeatherCondition::FreezingRain);
        assert_eq!(from_openweathermap(601), WeatherCondition::Snow);
        assert_eq!(from_openweathermap(741), WeatherCondition::Fog);
        assert_eq!(from_openweathermap(800), WeatherCondition::Clear);
        assert_eq!(from_openweathermap(804), WeatherCondition::Overcast);
        assert_eq!(from_openweathermap(781), WeatherCondition::Unknown);
    }

    #[test]
    fn weatherapi_codes() {
        assert_eq!(from_weatherapi(1000), WeatherCondition::Clear);
        assert_eq!(from_weatherapi(1183), WeatherCondition::LightRain);
        assert_eq!(from_weatherapi(1195), WeatherCondition::HeavyRain);
        assert_eq!(from_weatherapi(1225), WeatherCondition::Snow);
        assert_eq!(from_weatherapi(1276), WeatherCondition::Thunderstorm);
        assert_eq!(from_weatherapi(9999), WeatherCondition::Unknown);
    }

    #[test]
    fn tomorrow_io_codes_and_text() {
        assert_eq!(from_tomorrow_io(1100), WeatherCondition::MainlyClear);
        assert_eq!(from_tomorrow_io(4201), WeatherCondition::HeavyRain);
        assert_eq!(from_tomorrow_io(6001), WeatherCondition::FreezingRain);
        assert_eq!(tomorrow_io_text(4001), "Rain");
        assert_eq!(tomorrow_io_text(1), "Unknown");
    }

    #[test]
    fn visual_crossing_icons() {
        assert_eq!(from_visual_crossing_icon("clear-night"), WeatherCondition::Clear);
        assert_eq!(from_visual_crossing_icon("rain"), WeatherCondition::ModerateRain);
        assert_eq!(
            from_visual_crossing_icon("thunder-showers-day"),
            WeatherCondition::Thunderstorm
        );
        assert_eq!(from_visual_crossing_icon("wind"), WeatherCondition::Unknown);
    }
}
