//! Upstream provider credentials and fallback order.

use std::collections::HashMap;

use application::DEFAULT_ATTEMPT_TIMEOUT_SECS;
use domain::ProviderId;
use integration_weather::ProviderConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Credentials and endpoint override for one provider
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// API key (sensitive - uses `SecretString`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Endpoint override, e.g. a proxy or a mock server
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderCredentials {
    /// Credentials with only a key
    #[must_use]
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            base_url: None,
        }
    }

    /// Whether a non-blank key is present
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

/// Provider section of the application config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openweathermap: Option<ProviderCredentials>,

    #[serde(default)]
    pub weatherapi: Option<ProviderCredentials>,

    #[serde(default)]
    pub tomorrow_io: Option<ProviderCredentials>,

    #[serde(default)]
    pub visual_crossing: Option<ProviderCredentials>,

    /// Fallback order by provider id, highest priority first
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,

    /// Budget for a single provider attempt in seconds (default: 10)
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// HTTP client timeout per request in seconds (default: 15)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_priority() -> Vec<String> {
    ProviderId::DEFAULT_PRIORITY
        .iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

const fn default_attempt_timeout() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT_SECS
}

const fn default_request_timeout() -> u64 {
    15
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openweathermap: None,
            weatherapi: None,
            tomorrow_io: None,
            visual_crossing: None,
            priority: default_priority(),
            attempt_timeout_secs: default_attempt_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ProvidersConfig {
    /// Section for a credentialed provider; always `None` for simulation
    #[must_use]
    pub const fn credentials(&self, id: ProviderId) -> Option<&ProviderCredentials> {
        match id {
            ProviderId::OpenWeatherMap => self.openweathermap.as_ref(),
            ProviderId::WeatherApi => self.weatherapi.as_ref(),
            ProviderId::TomorrowIo => self.tomorrow_io.as_ref(),
            ProviderId::VisualCrossing => self.visual_crossing.as_ref(),
            ProviderId::Simulation => None,
        }
    }

    /// Whether at least one provider has a usable key
    #[must_use]
    pub fn any_credentials(&self) -> bool {
        ProviderId::DEFAULT_PRIORITY
            .iter()
            .any(|&id| self.credentials(id).is_some_and(ProviderCredentials::has_key))
    }

    /// Parse the priority list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPriority` for an unknown or repeated id.
    pub fn priority_ids(&self) -> Result<Vec<ProviderId>, ConfigError> {
        let mut ids = Vec::with_capacity(self.priority.len());
        for name in &self.priority {
            let id: ProviderId = name
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPriority(format!("unknown provider '{name}'")))?;
            if ids.contains(&id) {
                return Err(ConfigError::InvalidPriority(format!(
                    "provider '{name}' listed more than once"
                )));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    /// Adapter settings for every provider with a usable key
    #[must_use]
    pub fn integration_configs(&self) -> HashMap<ProviderId, ProviderConfig> {
        ProviderId::DEFAULT_PRIORITY
            .iter()
            .filter_map(|&id| {
                let credentials = self.credentials(id).filter(|c| c.has_key())?;
                let key = credentials.api_key.as_ref()?.expose_secret().to_string();
                let mut config =
                    ProviderConfig::new(id, key).with_timeout_secs(self.request_timeout_secs);
                if let Some(url) = &credentials.base_url {
                    config = config.with_base_url(url.as_str());
                }
                Some((id, config))
            })
            .collect()
    }
}
