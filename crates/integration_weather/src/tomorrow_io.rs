//! Tomorrow.io adapter
//!
//! Timeline forecast from `/v4/weather/forecast` in metric units. There is
//! no separate current block: the first minutely step (or the first hour)
//! stands in for it.

use async_trait::async_trait;
use domain::{
    DailyAggregate, ForecastBundle, LocationInfo, Observation, ProviderId, WeatherOperation,
    WeatherQuery,
};
use reqwest::Client;
use std::fmt;
use tracing::{debug, instrument};

use crate::{
    conditions, config::ProviderConfig, error::WeatherError, http, provider::WeatherProvider,
    units,
};

mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Response {
        pub timelines: Timelines,
        pub location: Location,
    }

    #[derive(Debug, Deserialize)]
    pub struct Location {
        pub lat: f64,
        pub lon: f64,
        pub name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Timelines {
        #[serde(default)]
        pub minutely: Vec<Step<HourValues>>,
        #[serde(default)]
        pub hourly: Vec<Step<HourValues>>,
        #[serde(default)]
        pub daily: Vec<Step<DayValues>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Step<V> {
        pub time: String,
        pub values: V,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HourValues {
        pub temperature: f64,
        pub temperature_apparent: Option<f64>,
        pub humidity: Option<f64>,
        pub pressure_surface_level: Option<f64>,
        pub wind_speed: Option<f64>,
        pub wind_direction: Option<f64>,
        pub precipitation_intensity: Option<f64>,
        pub precipitation_probability: Option<f64>,
        pub cloud_cover: Option<f64>,
        pub uv_index: Option<f64>,
        pub visibility: Option<f64>,
        pub weather_code: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DayValues {
        pub temperature_min: f64,
        pub temperature_max: f64,
        pub humidity_avg: Option<f64>,
        pub precipitation_intensity_avg: Option<f64>,
        pub rain_accumulation_sum: Option<f64>,
        pub precipitation_probability_max: Option<f64>,
        pub wind_speed_max: Option<f64>,
        pub sunrise_time: Option<String>,
        pub sunset_time: Option<String>,
        pub weather_code_max: Option<i64>,
    }
}

/// Tomorrow.io adapter
pub struct TomorrowIoProvider {
    client: Client,
    config: ProviderConfig,
}

impl fmt::Debug for TomorrowIoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TomorrowIoProvider")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl TomorrowIoProvider {
    /// Create a new adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ProviderConfig) -> Result<Self, WeatherError> {
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn observation(step: &api::Step<api::HourValues>) -> Result<Observation, WeatherError> {
        let timestamp = units::rfc3339_to_utc(&step.time)?;
        let v = &step.values;
        let mut observation = Observation::new(ProviderId::TomorrowIo, timestamp, v.temperature)
            .with_feels_like(v.temperature_apparent.unwrap_or(v.temperature))
            .with_humidity(v.humidity.unwrap_or_default())
            .with_wind(
                v.wind_speed.unwrap_or_default(),
                v.wind_direction.unwrap_or_default(),
            )
            .with_precipitation(
                v.precipitation_intensity.unwrap_or_default(),
                v.precipitation_probability.unwrap_or_default(),
            )
            .with_cloud_cover(v.cloud_cover.unwrap_or_default());
        if let Some(pressure) = v.pressure_surface_level {
            observation = observation.with_pressure(pressure);
        }
        if let Some(uv) = v.uv_index {
            observation = observation.with_uv_index(uv);
        }
        if let Some(visibility) = v.visibility {
            observation = observation.with_visibility(visibility);
        }
        if let Some(code) = v.weather_code {
            observation = observation.with_condition(
                conditions::from_tomorrow_io(code),
                conditions::tomorrow_io_text(code),
                Some(code),
            );
        }
        Ok(observation)
    }

    fn day(step: &api::Step<api::DayValues>) -> Result<DailyAggregate, WeatherError> {
        let date = units::rfc3339_to_utc(&step.time)?.date_naive();
        let v = &step.values;
        let total = v
            .rain_accumulation_sum
            .or_else(|| v.precipitation_intensity_avg.map(|avg| avg * 24.0))
            .unwrap_or_default();
        let sunrise = v
            .sunrise_time
            .as_deref()
            .map(units::rfc3339_to_utc)
            .transpose()?;
        let sunset = v
            .sunset_time
            .as_deref()
            .map(units::rfc3339_to_utc)
            .transpose()?;
        let mut aggregate = DailyAggregate::new(date, v.temperature_min, v.temperature_max)?
            .with_humidity(v.humidity_avg.unwrap_or_default())
            .with_precipitation(total, v.precipitation_probability_max.unwrap_or_default())
            .with_max_wind(v.wind_speed_max.unwrap_or_default())
            .with_sun(sunrise, sunset);
        if let Some(code) = v.weather_code_max {
            aggregate = aggregate.with_condition(
                conditions::from_tomorrow_io(code),
                conditions::tomorrow_io_text(code),
            );
        }
        Ok(aggregate)
    }

    /// Convert a timeline payload to a bundle
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::ParseError` when the payload is malformed or has
    /// no minutely or hourly steps.
    pub fn normalize(body: &[u8]) -> Result<ForecastBundle, WeatherError> {
        let response: api::Response = serde_json::from_slice(body)?;
        let timelines = &response.timelines;

        let current = timelines
            .minutely
            .first()
            .or_else(|| timelines.hourly.first())
            .ok_or_else(|| WeatherError::ParseError("timeline has no steps".to_string()))?;
        let current = Self::observation(current)?;

        let hourly = timelines
            .hourly
            .iter()
            .map(Self::observation)
            .collect::<Result<Vec<_>, _>>()?;
        let daily = timelines
            .daily
            .iter()
            .map(Self::day)
            .collect::<Result<Vec<_>, _>>()?;

        let mut location =
            LocationInfo::from_coordinates(response.location.lat, response.location.lon);
        if let Some(name) = &response.location.name {
            location.name.clone_from(name);
        }
        let last_updated = current.timestamp();

        ForecastBundle::new(
            location,
            current,
            hourly,
            daily,
            ProviderId::TomorrowIo,
            last_updated,
        )
        .map_err(WeatherError::from)
    }
}

#[async_trait]
impl WeatherProvider for TomorrowIoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::TomorrowIo
    }

    fn supports(&self, operation: WeatherOperation) -> bool {
        matches!(
            operation,
            WeatherOperation::Current | WeatherOperation::Extended
        )
    }

    #[instrument(
        skip(self),
        fields(
            provider = "tomorrow_io",
            lat = query.location().latitude(),
            lon = query.location().longitude()
        )
    )]
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, WeatherError> {
        crate::provider::ensure_supported(self, query)?;
        let location = query.location();
        let url = format!("{}/v4/weather/forecast", self.config.base_url);
        debug!(url = %url, "Sending Tomorrow.io request");

        let request = self.client.get(&url).query(&[
            (
                "location",
                format!("{},{}", location.latitude(), location.longitude()),
            ),
            ("units", "metric".to_string()),
            ("timesteps", "1h,1d".to_string()),
            ("apikey", self.config.api_key.clone()),
        ]);
        let body = http::send(request, self.config.timeout_secs).await?;
        Self::normalize(&body)
    }
}
