//! Shared HTTP plumbing for the credentialed providers

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::{config::ProviderConfig, error::WeatherError};

/// Build a client with the configured timeout
pub(crate) fn build_client(config: &ProviderConfig) -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))
}

/// Send a request and return the raw body of a successful response
///
/// Status mapping: 429 is a rate limit, 401 and 403 reject the key, 5xx is
/// an outage and any other non-success status is a failed request.
pub(crate) async fn send(request: RequestBuilder, timeout_secs: u64) -> Result<Bytes, WeatherError> {
    let response = request
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                WeatherError::Timeout { timeout_secs }
            } else if e.is_connect() {
                WeatherError::ConnectionFailed(e.to_string())
            } else {
                WeatherError::RequestFailed(e.to_string())
            }
        })?;

    let status = response.status();
    debug!(status = %status, "Received provider response");

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse().ok());
        return Err(WeatherError::RateLimitExceeded {
            retry_after_secs: retry_after,
        });
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(WeatherError::AuthenticationFailed(format!("HTTP {status}")));
    }

    if status.is_server_error() {
        return Err(WeatherError::ServiceUnavailable(format!("HTTP {status}")));
    }

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(WeatherError::RequestFailed(format!(
            "HTTP {status}: {error_text}"
        )));
    }

    response
        .bytes()
        .await
        .map_err(|e| WeatherError::RequestFailed(e.to_string()))
}
