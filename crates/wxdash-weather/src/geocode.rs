//! Location search and reverse lookup against the Open-Meteo geocoding API.
//! Free, no API key required.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::http::{build_client, decode_json, DEFAULT_TIMEOUT};
use crate::types::{Coordinates, Location, LocationError, WeatherError};

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_MAX_RESULTS: u8 = 10;
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    name: &'a str,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Serialize)]
struct ReverseQuery<'a> {
    latitude: String,
    longitude: String,
    count: u8,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    admin1: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl GeocodingResult {
    fn into_location(self) -> Option<Location> {
        let name = self.name.trim().to_string();
        if name.is_empty() || !Coordinates::new(self.latitude, self.longitude).is_valid() {
            return None;
        }

        let region = self
            .admin1
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let country = self
            .country_code
            .or(self.country)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        Some(Location {
            name,
            region,
            country,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// Client for the geocoding endpoint.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    max_results: u8,
    min_query_len: usize,
}

impl GeocodingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        })
    }

    /// Client for the public Open-Meteo endpoint.
    pub fn open_meteo() -> Result<Self, WeatherError> {
        Self::new(GEOCODING_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_max_results(mut self, max_results: u8) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }

    /// Search places by free text.
    ///
    /// Never fails: transport and payload errors are logged and produce an
    /// empty list, as do queries shorter than the minimum length.
    pub async fn search(&self, query: &str) -> Vec<Location> {
        match self.try_search(query).await {
            Ok(locations) => locations,
            Err(e) => {
                tracing::warn!("Location search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Search places by free text, surfacing the failure cause.
    #[instrument(skip(self), level = "debug")]
    pub async fn try_search(&self, query: &str) -> Result<Vec<Location>, WeatherError> {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            tracing::debug!("Query too short, skipping geocoder");
            return Ok(Vec::new());
        }

        let params = SearchQuery {
            name: query,
            count: self.max_results,
            language: "en",
            format: "json",
        };

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let body: GeocodingResponse = decode_json(response, "geocoding").await?;

        if body.error {
            return Err(WeatherError::Parse(format!(
                "geocoding error: {}",
                body.reason.as_deref().unwrap_or("unknown")
            )));
        }

        let locations: Vec<Location> = body
            .results
            .into_iter()
            .filter_map(GeocodingResult::into_location)
            .collect();

        tracing::debug!("Geocoder returned {} locations", locations.len());
        Ok(locations)
    }

    /// Resolve coordinates to the nearest named place.
    ///
    /// Uses the same endpoint as `search`, with coordinates rounded to 4
    /// decimals. The returned location keeps the rounded input coordinates.
    #[instrument(skip(self), level = "debug")]
    pub async fn reverse(&self, coords: Coordinates) -> Result<Location, LocationError> {
        let rounded = coords.rounded();
        let not_found = || LocationError::NotFound {
            latitude: rounded.latitude,
            longitude: rounded.longitude,
        };

        let params = ReverseQuery {
            latitude: format!("{:.4}", rounded.latitude),
            longitude: format!("{:.4}", rounded.longitude),
            count: 1,
            format: "json",
        };

        let response = match self.client.get(&self.base_url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return Err(if e.is_timeout() {
                    LocationError::Timeout
                } else {
                    LocationError::ServiceUnavailable
                });
            }
        };

        let body: GeocodingResponse = match decode_json(response, "geocoding").await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode failed: {}", e);
                return Err(not_found());
            }
        };

        let place = body
            .results
            .into_iter()
            .find_map(GeocodingResult::into_location)
            .ok_or_else(not_found)?;

        tracing::info!("Reverse geocoded to: {}, {}", place.name, place.country);
        Ok(Location {
            latitude: rounded.latitude,
            longitude: rounded.longitude,
            ..place
        })
    }
}
