//! Shared reqwest plumbing for the geocoding and forecast clients.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::types::WeatherError;

pub(crate) const USER_AGENT: &str = concat!("wxdash/", env!("CARGO_PKG_VERSION"));
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Open-Meteo error body: `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    reason: Option<String>,
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, WeatherError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Check the status and decode a JSON body.
///
/// Non-success statuses become `WeatherError::Http` carrying the upstream
/// `reason` when one is present; undecodable bodies become `WeatherError::Parse`.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T, WeatherError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.reason)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(WeatherError::Http {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| WeatherError::Parse(format!("{} payload: {}", what, e)))
}
