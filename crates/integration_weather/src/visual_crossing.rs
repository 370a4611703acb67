//! Visual Crossing Timeline adapter
//!
//! One endpoint serves forecasts and history: `/timeline/{lat},{lon}` for the
//! next fifteen days and `/timeline/{lat},{lon}/{start}/{end}` for past dates.
//! Wind arrives in km/h.

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
    #[serde(rename_all = "camelCase")]
    pub struct Response {
        pub latitude: f64,
        pub longitude: f64,
        pub resolved_address: Option<String>,
        pub timezone: Option<String>,
        #[serde(default)]
        pub days: Vec<Day>,
        #[serde(default)]
        pub alerts: Vec<Alert>,
        pub current_conditions: Option<Hour>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Hour {
        pub datetime_epoch: i64,
        pub temp: f64,
        pub feelslike: Option<f64>,
        pub humidity: Option<f64>,
        pub pressure: Option<f64>,
        pub windspeed: Option<f64>,
        pub winddir: Option<f64>,
        pub precip: Option<f64>,
        pub precipprob: Option<f64>,
        pub cloudcover: Option<f64>,
        pub uvindex: Option<f64>,
        pub visibility: Option<f64>,
        pub conditions: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Day {
        pub datetime: String,
        pub tempmin: f64,
        pub tempmax: f64,
        pub humidity: Option<f64>,
        pub precip: Option<f64>,
        pub precipprob: Option<f64>,
        pub windspeed: Option<f64>,
        pub conditions: Option<String>,
        pub icon: Option<String>,
        pub sunrise_epoch: Option<i64>,
        pub sunset_epoch: Option<i64>,
        #[serde(default)]
        pub hours: Vec<Hour>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Alert {
        pub event: Option<String>,
        pub headline: Option<String>,
        pub description: Option<String>,
        pub onset_epoch: Option<i64>,
        pub ends_epoch: Option<i64>,
    }
}

/// Visual Crossing adapter
pub struct VisualCrossingProvider {
    client: Client,
    config: ProviderConfig,
}

impl fmt::Debug for VisualCrossingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualCrossingProvider")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl VisualCrossingProvider {
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
        let timestamp = units::epoch_to_utc(hour.datetime_epoch)?;
        let mut observation = Observation::new(ProviderId::VisualCrossing, timestamp, hour.temp)
            .with_feels_like(hour.feelslike.unwrap_or(hour.temp))
            .with_humidity(hour.humidity.unwrap_or_default())
            .with_wind(
                units::kph_to_ms(hour.windspeed.unwrap_or_default()),
                hour.winddir.unwrap_or_default(),
            )
            .with_precipitation(
                hour.precip.unwrap_or_default(),
                hour.precipprob.unwrap_or_default(),
            )
            .with_cloud_cover(hour.cloudcover.unwrap_or_default());
        if let Some(pressure) = hour.pressure {
            observation = observation.with_pressure(pressure);
        }
        if let Some(uv) = hour.uvindex {
            observation = observation.with_uv_index(uv);
        }
        if let Some(visibility) = hour.visibility {
            observation = observation.with_visibility(visibility);
        }
        if let Some(icon) = &hour.icon {
            observation = observation.with_condition(
                conditions::from_visual_crossing_icon(icon),
                hour.conditions.clone().unwrap_or_default(),
                None,
            );
        }
        Ok(observation)
    }

    fn day(day: &api::Day) -> Result<DailyAggregate, WeatherError> {
        let date = units::parse_date(&day.datetime)?;
        let sunrise = day.sunrise_epoch.map(units::epoch_to_utc).transpose()?;
        let sunset = day.sunset_epoch.map(units::epoch_to_utc).transpose()?;
        let mut aggregate = DailyAggregate::new(date, day.tempmin, day.tempmax)?
            .with_humidity(day.humidity.unwrap_or_default())
            .with_precipitation(
                day.precip.unwrap_or_default(),
                day.precipprob.unwrap_or_default(),
            )
            .with_max_wind(units::kph_to_ms(day.windspeed.unwrap_or_default()))
            .with_sun(sunrise, sunset);
        if let Some(icon) = &day.icon {
            aggregate = aggregate.with_condition(
                conditions::from_visual_crossing_icon(icon),
                day.conditions.clone().unwrap_or_default(),
            );
        }
        Ok(aggregate)
    }

    fn alert(alert: &api::Alert) -> Result<WeatherAlert, WeatherError> {
        let title = alert
            .headline
            .clone()
            .or_else(|| alert.event.clone())
            .unwrap_or_default();
        Ok(
            WeatherAlert::new(title, alert.description.clone().unwrap_or_default())
                .with_window(
                    alert.onset_epoch.map(units::epoch_to_utc).transpose()?,
                    alert.ends_epoch.map(units::epoch_to_utc).transpose()?,
                )
                .with_source(alert.event.clone().unwrap_or_default()),
        )
    }

    /// Convert a timeline payload to a bundle
    ///
    /// History payloads carry no current conditions; the latest hour stands in.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::ParseError` when the payload is malformed or has
    /// neither current conditions nor hourly readings.
    pub fn normalize(body: &[u8]) -> Result<ForecastBundle, WeatherError> {
        let response: api::Response = serde_json::from_slice(body)?;

        let hourly = response
            .days
            .iter()
            .flat_map(|d| d.hours.iter())
            .map(Self::observation)
            .collect::<Result<Vec<_>, _>>()?;
        let daily = response
            .days
            .iter()
            .map(Self::day)
            .collect::<Result<Vec<_>, _>>()?;
        let alerts = response
            .alerts
            .iter()
            .map(Self::alert)
            .collect::<Result<Vec<_>, _>>()?;

        let current = match &response.current_conditions {
            Some(hour) => Self::observation(hour)?,
            None => hourly.last().cloned().ok_or_else(|| {
                WeatherError::ParseError("no current conditions or hourly readings".to_string())
            })?,
        };

        let mut location = LocationInfo::from_coordinates(response.latitude, response.longitude);
        if let Some(address) = &response.resolved_address {
            location.name.clone_from(address);
        }
        if let Some(timezone) = &response.timezone {
            location.timezone.clone_from(timezone);
        }
        let last_updated = current.timestamp();

        Ok(ForecastBundle::new(
            location,
            current,
            hourly,
            daily,
            ProviderId::VisualCrossing,
            last_updated,
        )?
        .with_alerts(alerts))
    }

    fn timeline_url(&self, query: &WeatherQuery) -> String {
        let location = query.location();
        let base = format!(
            "{}/timeline/{},{}",
            self.config.base_url,
            location.latitude(),
            location.longitude()
        );
        match query {
            WeatherQuery::Historical { range, .. } => format!(
                "{base}/{}/{}",
                range.start().format("%Y-%m-%d"),
                range.end().format("%Y-%m-%d")
            ),
            WeatherQuery::Current { .. } | WeatherQuery::Extended { .. } => base,
        }
    }
}

#[async_trait]
impl WeatherProvider for VisualCrossingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::VisualCrossing
    }

    fn supports(&self, _operation: WeatherOperation) -> bool {
        true
    }

    #[instrument(
        skip(self),
        fields(
            provider = "visual_crossing",
            lat = query.location().latitude(),
            lon = query.location().longitude()
        )
    )]
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, WeatherError> {
        let url = self.timeline_url(query);
        debug!(url = %url, "Sending Visual Crossing request");

        let include = match query.operation() {
            WeatherOperation::Historical => "hours,days",
            WeatherOperation::Current | WeatherOperation::Extended => "current,hours,days,alerts",
        };
        let request = self.client.get(&url).query(&[
            ("unitGroup", "metric"),
            ("include", include),
            ("contentType", "json"),
            ("key", self.config.api_key.as_str()),
        ]);
        let body = http::send(request, self.config.timeout_secs).await?;
        Self::normalize(&body)
    }
}
