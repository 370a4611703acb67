//! OpenWeatherMap One Call 3.0 adapter
//!
//! Client for the One Call API (<https://openweathermap.org/api/one-call-3>),
//! requested in metric units. Wind arrives in m/s and visibility in metres.

use async_trait::async_trait;
use domain::{
    DailyAggregate, ForecastBundle, LocationInfo, Observation, ProviderId, WeatherAlert,
    WeatherOperation, WeatherQuery,
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
    pub struct OneCallResponse {
        pub lat: f64,
        pub lon: f64,
        pub timezone: Option<String>,
        pub current: Option<Hour>,
        #[serde(default)]
        pub hourly: Vec<Hour>,
        #[serde(default)]
        pub daily: Vec<Day>,
        #[serde(default)]
        pub alerts: Vec<Alert>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Hour {
        pub dt: i64,
        pub temp: f64,
        pub feels_like: Option<f64>,
        pub humidity: Option<f64>,
        pub pressure: Option<f64>,
        pub wind_speed: Option<f64>,
        pub wind_deg: Option<f64>,
        pub clouds: Option<f64>,
        pub uvi: Option<f64>,
        pub visibility: Option<f64>,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub rain: Option<Rain>,
        pub pop: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Rain {
        #[serde(rename = "1h")]
        pub one_hour: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub id: i64,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Day {
        pub dt: i64,
        pub sunrise: Option<i64>,
        pub sunset: Option<i64>,
        pub temp: DayTemperature,
        pub humidity: Option<f64>,
        pub wind_speed: Option<f64>,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub pop: Option<f64>,
        pub rain: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DayTemperature {
        pub min: f64,
        pub max: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Alert {
        pub sender_name: Option<String>,
        pub event: String,
        pub start: Option<i64>,
        pub end: Option<i64>,
        #[serde(default)]
        pub description: String,
    }
}

/// OpenWeatherMap adapter
pub struct OpenWeatherMapProvider {
    client: Client,
    config: ProviderConfig,
}

impl fmt::Debug for OpenWeatherMapProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherMapProvider")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherMapProvider {
    /// Create a new adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ProviderConfig) -> Result<Self, WeatherError> {
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn observation(hour: &api::Hour) -> Result<Observation, WeatherError> {
        let timestamp = units::epoch_to_utc(hour.dt)?;
        let mut observation = Observation::new(ProviderId::OpenWeatherMap, timestamp, hour.temp)
            .with_feels_like(hour.feels_like.unwrap_or(hour.temp))
            .with_humidity(hour.humidity.unwrap_or_default())
            .with_wind(
                hour.wind_speed.unwrap_or_default(),
                hour.wind_deg.unwrap_or_default(),
            )
            .with_precipitation(
                hour.rain.as_ref().and_then(|r| r.one_hour).unwrap_or_default(),
                units::fraction_to_percent(hour.pop.unwrap_or_default()),
            )
            .with_cloud_cover(hour.clouds.unwrap_or_default());
        if let Some(pressure) = hour.pressure {
            observation = observation.with_pressure(pressure);
        }
        if let Some(uvi) = hour.uvi {
            observation = observation.with_uv_index(uvi);
        }
        if let Some(visibility) = hour.visibility {
            observation = observation.with_visibility(units::metres_to_km(visibility));
        }
        if let Some(weather) = hour.weather.first() {
            observation = observation.with_condition(
                conditions::from_openweathermap(weather.id),
                weather.description.clone(),
                Some(weather.id),
            );
        }
        Ok(observation)
    }

    fn day(day: &api::Day, tz: chrono_tz::Tz) -> Result<DailyAggregate, WeatherError> {
        let date = units::local_date(units::epoch_to_utc(day.dt)?, tz);
        let sunrise = day.sunrise.map(units::epoch_to_utc).transpose()?;
        let sunset = day.sunset.map(units::epoch_to_utc).transpose()?;
        let mut aggregate = DailyAggregate::new(date, day.temp.min, day.temp.max)?
            .with_humidity(day.humidity.unwrap_or_default())
            .with_precipitation(
                day.rain.unwrap_or_default(),
                units::fraction_to_percent(day.pop.unwrap_or_default()),
            )
            .with_max_wind(day.wind_speed.unwrap_or_default())
            .with_sun(sunrise, sunset);
        if let Some(weather) = day.weather.first() {
            aggregate = aggregate.with_condition(
                conditions::from_openweathermap(weather.id),
                weather.description.clone(),
            );
        }
        Ok(aggregate)
    }

    fn alert(alert: &api::Alert) -> Result<WeatherAlert, WeatherError> {
        let starts_at = alert.start.map(units::epoch_to_utc).transpose()?;
        let ends_at = alert.end.map(units::epoch_to_utc).transpose()?;
        Ok(WeatherAlert::new(alert.event.clone(), alert.description.clone())
            .with_window(starts_at, ends_at)
            .with_source(alert.sender_name.clone().unwrap_or_default()))
    }

    /// Convert a One Call payload to a bundle
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::ParseError` when the payload is malformed or has
    /// no current conditions.
    pub fn normalize(body: &[u8]) -> Result<ForecastBundle, WeatherError> {
        let response: api::OneCallResponse = serde_json::from_slice(body)?;
        let current = response
            .current
            .as_ref()
            .ok_or_else(|| WeatherError::ParseError("missing current conditions".to_string()))?;
        let current = Self::observation(current)?;

        let tz_name = response.timezone.clone().unwrap_or_else(|| "UTC".to_string());
        let tz = units::resolve_timezone(&tz_name);

        let hourly = response
            .hourly
            .iter()
            .map(Self::observation)
            .collect::<Result<Vec<_>, _>>()?;
        let daily = response
            .daily
            .iter()
            .map(|d| Self::day(d, tz))
            .collect::<Result<Vec<_>, _>>()?;
        let alerts = response
            .alerts
            .iter()
            .map(Self::alert)
            .collect::<Result<Vec<_>, _>>()?;

        let mut location = LocationInfo::from_coordinates(response.lat, response.lon);
        location.timezone = tz_name;
        let last_updated = current.timestamp();

        Ok(ForecastBundle::new(
            location,
            current,
            hourly,
            daily,
            ProviderId::OpenWeatherMap,
            last_updated,
        )?
        .with_alerts(alerts))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeatherMap
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
            provider = "openweathermap",
            lat = query.location().latitude(),
            lon = query.location().longitude()
        )
    )]
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, WeatherError> {
        crate::provider::ensure_supported(self, query)?;
        let location = query.location();
        let url = format!("{}/data/3.0/onecall", self.config.base_url);
        debug!(url = %url, "Sending OpenWeatherMap request");

        let request = self.client.get(&url).query(&[
            ("lat", location.latitude().to_string()),
            ("lon", location.longitude().to_string()),
            ("units", "metric".to_string()),
            ("exclude", "minutely".to_string()),
            ("appid", self.config.api_key.clone()),
        ]);
        let body = http::send(request, self.config.timeout_secs).await?;
        Self::normalize(&body)
    }
}
