//! Provider adapter configuration

use domain::ProviderId;
use serde::{Deserialize, Serialize};

/// Connection settings for one credentialed provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key sent with every request
    pub api_key: String,

    /// API base URL without trailing slash
    pub base_url: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    15
}

/// Public endpoint of each provider
#[must_use]
pub const fn default_base_url(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenWeatherMap => "https://api.openweathermap.org",
        ProviderId::WeatherApi => "https://api.weatherapi.com/v1",
        ProviderId::TomorrowIo => "https://api.tomorrow.io",
        ProviderId::VisualCrossing => {
            "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services"
        },
        ProviderId::Simulation => "",
    }
}

impl ProviderConfig {
    /// Configuration pointing at the provider's public endpoint
    #[must_use]
    pub fn new(provider: ProviderId, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(provider).to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Override the endpoint, e.g. for a proxy or a mock server
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
