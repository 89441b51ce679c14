//! Forecast fetching from the Open-Meteo API.
//!
//! One request returns current conditions plus hourly and daily series. The
//! payload is normalized to fixed field names, Celsius and km/h before it
//! leaves this module.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::http::{build_client, decode_json, DEFAULT_TIMEOUT};
use crate::types::{
    to_celsius, Coordinates, CurrentWeather, DailySeries, HourlySeries, Location, WeatherBundle,
    WeatherError,
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HOURLY_FIELDS: &str =
    "temperature_2m,relativehumidity_2m,precipitation_probability,windspeed_10m,weathercode";
const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,sunrise,sunset";

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    hourly: &'a str,
    daily: &'a str,
    current_weather: bool,
    timezone: &'a str,
    temperature_unit: &'a str,
    windspeed_unit: &'a str,
    precipitation_unit: &'a str,
}

type UnitBlock = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    current_weather: Option<UpstreamCurrent>,
    #[serde(default)]
    current_weather_units: UnitBlock,
    hourly: Option<UpstreamHourly>,
    #[serde(default)]
    hourly_units: UnitBlock,
    daily: Option<UpstreamDaily>,
    #[serde(default)]
    daily_units: UnitBlock,
}

#[derive(Debug, Deserialize)]
struct UpstreamCurrent {
    temperature: f64,
    #[serde(alias = "weather_code")]
    weathercode: i32,
    #[serde(alias = "wind_speed")]
    windspeed: f64,
    time: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default, alias = "relative_humidity_2m")]
    relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default, alias = "wind_speed_10m")]
    windspeed_10m: Vec<Option<f64>>,
    #[serde(default, alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct UpstreamDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
    #[serde(default, alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
}

/// Client for the forecast endpoint.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        Ok(Self {
            client: Arc::new(build_client(timeout)?),
            base_url: base_url.to_string(),
        })
    }

    /// Provider for the public Open-Meteo endpoint.
    pub fn open_meteo() -> Result<Self, WeatherError> {
        Self::new(FORECAST_URL, DEFAULT_TIMEOUT)
    }

    /// Fetch the forecast for a place returned by the geocoder.
    pub async fn fetch_location(&self, location: &Location) -> Result<WeatherBundle, WeatherError> {
        self.fetch(location.latitude, location.longitude).await
    }

    /// Fetch current, hourly and daily weather in a single request.
    ///
    /// No retry and no partial result: any transport, status or payload
    /// problem is returned as one error.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherBundle, WeatherError> {
        if !Coordinates::new(latitude, longitude).is_valid() {
            return Err(WeatherError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        let params = ForecastQuery {
            latitude,
            longitude,
            hourly: HOURLY_FIELDS,
            daily: DAILY_FIELDS,
            current_weather: true,
            timezone: "auto",
            temperature_unit: "celsius",
            windspeed_unit: "kmh",
            precipitation_unit: "mm",
        };

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let payload: ForecastResponse = decode_json(response, "forecast").await?;
        let bundle = normalize(payload)?;

        tracing::info!(
            "Fetched forecast: {} hourly, {} daily entries ({})",
            bundle.hourly.len(),
            bundle.daily.len(),
            bundle.timezone
        );
        Ok(bundle)
    }
}

fn normalize(payload: ForecastResponse) -> Result<WeatherBundle, WeatherError> {
    let current = payload
        .current_weather
        .ok_or_else(|| WeatherError::Parse("forecast payload: missing current_weather".into()))?;
    let hourly = payload
        .hourly
        .ok_or_else(|| WeatherError::Parse("forecast payload: missing hourly".into()))?;
    let daily = payload
        .daily
        .ok_or_else(|| WeatherError::Parse("forecast payload: missing daily".into()))?;

    let current = normalize_current(current, &payload.current_weather_units)?;
    let hourly = normalize_hourly(hourly, &payload.hourly_units)?;
    let daily = normalize_daily(daily, &payload.daily_units)?;

    if hourly.is_empty() {
        return Err(WeatherError::Parse("forecast payload: empty hourly series".into()));
    }
    if daily.is_empty() {
        return Err(WeatherError::Parse("forecast payload: empty daily series".into()));
    }

    Ok(WeatherBundle {
        current,
        hourly,
        daily,
        timezone: payload
            .timezone
            .map(|tz| tz.trim().to_string())
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| "GMT".to_string()),
        utc_offset_seconds: payload.utc_offset_seconds,
        fetched_at: Utc::now(),
    })
}

fn normalize_current(
    current: UpstreamCurrent,
    units: &UnitBlock,
) -> Result<CurrentWeather, WeatherError> {
    let temp_unit = unit_of(units, &["temperature"]);
    let wind_unit = unit_of(units, &["windspeed", "wind_speed"]);

    Ok(CurrentWeather {
        temperature_2m: temperature_to_celsius(current.temperature, temp_unit),
        weather_code: current.weathercode,
        wind_speed_10m: wind_to_kmh(current.windspeed, wind_unit),
        time: parse_timestamp(&current.time)?,
    })
}

fn normalize_hourly(
    hourly: UpstreamHourly,
    units: &UnitBlock,
) -> Result<HourlySeries, WeatherError> {
    let temp_unit = unit_of(units, &["temperature_2m"]);
    let wind_unit = unit_of(units, &["windspeed_10m", "wind_speed_10m"]);

    // Optional measurements may be absent entirely; only present ones bound the length.
    let mut len = hourly
        .time
        .len()
        .min(hourly.temperature_2m.len())
        .min(hourly.weathercode.len());
    for optional in [
        &hourly.relativehumidity_2m,
        &hourly.precipitation_probability,
        &hourly.windspeed_10m,
    ] {
        if !optional.is_empty() {
            len = len.min(optional.len());
        }
    }
    if len < hourly.time.len() {
        tracing::warn!(
            "Hourly series fields disagree in length ({} timestamps), truncating to {}",
            hourly.time.len(),
            len
        );
    }

    let first_gap = (0..len)
        .find(|&i| hourly.temperature_2m[i].is_none() || hourly.weathercode[i].is_none())
        .unwrap_or(len);
    if first_gap < len {
        tracing::warn!("Hourly series has a null at index {}, truncating", first_gap);
    }
    let len = first_gap;

    let time = hourly.time[..len]
        .iter()
        .map(|t| parse_timestamp(t))
        .collect::<Result<Vec<_>, _>>()?;

    let optional = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut series = HourlySeries {
        time,
        temperature_2m: hourly.temperature_2m[..len]
            .iter()
            .flatten()
            .map(|&t| temperature_to_celsius(t, temp_unit))
            .collect(),
        relative_humidity_2m: (0..len)
            .map(|i| optional(&hourly.relativehumidity_2m, i))
            .collect(),
        precipitation_probability: (0..len)
            .map(|i| optional(&hourly.precipitation_probability, i))
            .collect(),
        wind_speed_10m: (0..len)
            .map(|i| optional(&hourly.windspeed_10m, i).map(|w| wind_to_kmh(w, wind_unit)))
            .collect(),
        weather_code: hourly.weathercode[..len].iter().flatten().copied().collect(),
    };
    series.truncate(len);
    debug_assert!(series.is_aligned());
    Ok(series)
}

fn normalize_daily(daily: UpstreamDaily, units: &UnitBlock) -> Result<DailySeries, WeatherError> {
    let max_unit = unit_of(units, &["temperature_2m_max"]);
    let min_unit = unit_of(units, &["temperature_2m_min"]);

    let len = daily
        .time
        .len()
        .min(daily.temperature_2m_max.len())
        .min(daily.temperature_2m_min.len())
        .min(daily.sunrise.len())
        .min(daily.sunset.len())
        .min(daily.weathercode.len());
    if len < daily.time.len() {
        tracing::warn!(
            "Daily series fields disagree in length ({} dates), truncating to {}",
            daily.time.len(),
            len
        );
    }

    let first_gap = (0..len)
        .find(|&i| {
            daily.temperature_2m_max[i].is_none()
                || daily.temperature_2m_min[i].is_none()
                || daily.sunrise[i].is_none()
                || daily.sunset[i].is_none()
                || daily.weathercode[i].is_none()
        })
        .unwrap_or(len);
    if first_gap < len {
        tracing::warn!("Daily series has a null at index {}, truncating", first_gap);
    }
    let len = first_gap;

    let time = daily.time[..len]
        .iter()
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| WeatherError::Parse(format!("daily date {:?}: {}", d, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let parse_all = |values: &[Option<String>]| -> Result<Vec<NaiveDateTime>, WeatherError> {
        values[..len].iter().flatten().map(|s| parse_timestamp(s)).collect()
    };

    let mut series = DailySeries {
        time,
        temperature_2m_max: daily.temperature_2m_max[..len]
            .iter()
            .flatten()
            .map(|&t| temperature_to_celsius(t, max_unit))
            .collect(),
        temperature_2m_min: daily.temperature_2m_min[..len]
            .iter()
            .flatten()
            .map(|&t| temperature_to_celsius(t, min_unit))
            .collect(),
        sunrise: parse_all(&daily.sunrise)?,
        sunset: parse_all(&daily.sunset)?,
        weather_code: daily.weathercode[..len].iter().flatten().copied().collect(),
    };
    series.truncate(len);
    debug_assert!(series.is_aligned());
    Ok(series)
}

fn unit_of<'a>(units: &'a UnitBlock, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| units.get(*k)).map(String::as_str)
}

fn temperature_to_celsius(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some(u) if u.contains('F') => to_celsius(value),
        _ => value,
    }
}

fn wind_to_kmh(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some("mph") => value * 1.609_344,
        Some("m/s") | Some("ms") => value * 3.6,
        Some("kn") => value * 1.852,
        _ => value,
    }
}

/// Open-Meteo local timestamps: `2026-10-18T14:00`, occasionally with seconds.
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| WeatherError::Parse(format!("timestamp {:?}: {}", raw, e)))
}
