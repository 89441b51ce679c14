use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse weather categories used for icons and backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    Rainy,
    Snowy,
    Storm,
}

impl WeatherCategory {
    /// Classify a WMO weather code.
    ///
    /// Codes outside every range (fog, showers, unknown values) fall back to
    /// `Cloudy`.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::Cloudy,
            51..=67 => Self::Rainy,
            71..=77 => Self::Snowy,
            95..=99 => Self::Storm,
            _ => Self::Cloudy,
        }
    }

    /// Get icon name (the view picks the glyph)
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::Cloudy => "cloud",
            Self::Rainy => "cloud_rain",
            Self::Snowy => "cloud_snow",
            Self::Storm => "cloud_lightning",
        }
    }
}

/// Human-readable description of a WMO weather code.
pub fn describe_wmo_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        _ => "Unknown",
    }
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Raw device coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Round both axes to 4 decimals (about 11 m).
    pub fn rounded(&self) -> Self {
        Self {
            latitude: round4(self.latitude),
            longitude: round4(self.longitude),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// A named place returned by the geocoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// Administrative region (state, province)
    pub region: Option<String>,
    /// ISO country code when known, otherwise the country name
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Current conditions. Temperature in °C, wind in km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_2m: f64,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
    pub time: NaiveDateTime,
}

impl CurrentWeather {
    pub fn category(&self) -> WeatherCategory {
        WeatherCategory::from_wmo_code(self.weather_code)
    }
}

/// Hourly series as index-aligned parallel arrays, local time of the location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<NaiveDateTime>,
    pub temperature_2m: Vec<f64>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub weather_code: Vec<i32>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Copy of up to `len` entries starting at `start`, clipped to bounds.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        Self {
            time: take(&self.time, start, len),
            temperature_2m: take(&self.temperature_2m, start, len),
            relative_humidity_2m: take(&self.relative_humidity_2m, start, len),
            precipitation_probability: take(&self.precipitation_probability, start, len),
            wind_speed_10m: take(&self.wind_speed_10m, start, len),
            weather_code: take(&self.weather_code, start, len),
        }
    }

    /// Index of the entry for the hour containing `at`, if present.
    pub fn index_of_hour(&self, at: NaiveDateTime) -> Option<usize> {
        self.time
            .iter()
            .position(|t| *t <= at && at < *t + Duration::hours(1))
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.time.truncate(len);
        self.temperature_2m.truncate(len);
        self.relative_humidity_2m.truncate(len);
        self.precipitation_probability.truncate(len);
        self.wind_speed_10m.truncate(len);
        self.weather_code.truncate(len);
    }

    pub(crate) fn is_aligned(&self) -> bool {
        let n = self.time.len();
        self.temperature_2m.len() == n
            && self.relative_humidity_2m.len() == n
            && self.precipitation_probability.len() == n
            && self.wind_speed_10m.len() == n
            && self.weather_code.len() == n
    }
}

/// Daily series as index-aligned parallel arrays, local dates of the location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub sunrise: Vec<NaiveDateTime>,
    pub sunset: Vec<NaiveDateTime>,
    pub weather_code: Vec<i32>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Copy of up to `len` entries starting at `start`, clipped to bounds.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        Self {
            time: take(&self.time, start, len),
            temperature_2m_max: take(&self.temperature_2m_max, start, len),
            temperature_2m_min: take(&self.temperature_2m_min, start, len),
            sunrise: take(&self.sunrise, start, len),
            sunset: take(&self.sunset, start, len),
            weather_code: take(&self.weather_code, start, len),
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.time.truncate(len);
        self.temperature_2m_max.truncate(len);
        self.temperature_2m_min.truncate(len);
        self.sunrise.truncate(len);
        self.sunset.truncate(len);
        self.weather_code.truncate(len);
    }

    pub(crate) fn is_aligned(&self) -> bool {
        let n = self.time.len();
        self.temperature_2m_max.len() == n
            && self.temperature_2m_min.len() == n
            && self.sunrise.len() == n
            && self.sunset.len() == n
            && self.weather_code.len() == n
    }
}

fn take<T: Clone>(values: &[T], start: usize, len: usize) -> Vec<T> {
    values.iter().skip(start).take(len).cloned().collect()
}

/// Complete weather data bundle for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub current: CurrentWeather,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
    /// IANA zone name resolved by the provider
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherBundle {
    /// Wall-clock time at the forecast location.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.naive_utc() + Duration::seconds(i64::from(self.utc_offset_seconds))
    }

    /// Humidity for the hour containing `at`, if the series covers it.
    pub fn humidity_at(&self, at: NaiveDateTime) -> Option<f64> {
        let idx = self.hourly.index_of_hour(at)?;
        self.hourly.relative_humidity_2m.get(idx).copied().flatten()
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("No place found near {latitude}, {longitude}")]
    NotFound { latitude: f64, longitude: f64 },
}

impl LocationError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}
