//! Dashboard controller.
//!
//! Owns the HTTP clients and the [`AppState`], and drives the
//! search -> select -> fetch flow. The state lock is never held across an
//! await point.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use wxdash_core::{AppError, Config, ConfigError, LocationConfig, TemperatureUnit, WeatherServiceError};
use wxdash_weather::{
    resolve_current_position, Coordinates, FixedPosition, GeocodingClient, Location,
    NoPositionSource, PositionSource, SearchDebouncer, WeatherProvider,
};

use crate::display::{forecast_view, ForecastView};
use crate::error_mapping::{client_error, fetch_error, location_error};
use crate::state::{AppState, ThemeMode};

/// Everything a view needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub theme: ThemeMode,
    pub loading: bool,
    pub error: Option<String>,
    pub forecast: Option<ForecastView>,
}

#[derive(Clone)]
pub struct Dashboard {
    geocoder: GeocodingClient,
    provider: WeatherProvider,
    debouncer: SearchDebouncer,
    state: Arc<Mutex<AppState>>,
    featured: Arc<Vec<Location>>,
    unit: TemperatureUnit,
    min_query_len: usize,
    position: Option<FixedPosition>,
}

/// Clears the loading flag when a fetch future is dropped mid-request.
struct FetchGuard<'a> {
    state: &'a Mutex<AppState>,
    armed: bool,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Weather fetch dropped before completion");
            self.state.lock().fetch_cancelled();
        }
    }
}

/// Position pinned in the `[location]` config section, if both halves are set.
pub fn position_from_config(location: &LocationConfig) -> Option<FixedPosition> {
    location
        .coordinates()
        .map(|(lat, lon)| FixedPosition(Coordinates::new(lat, lon)))
}

impl Dashboard {
    /// Build a dashboard from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let validation = config.validate();
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        let timeout = Duration::from_secs(config.weather.request_timeout_secs);
        let geocoder = GeocodingClient::new(&config.weather.geocoding_url, timeout)
            .map_err(client_error)?
            .with_max_results(config.search.max_results)
            .with_min_query_len(config.search.min_query_len);
        let provider =
            WeatherProvider::new(&config.weather.forecast_url, timeout).map_err(client_error)?;

        let featured = config
            .featured_cities
            .iter()
            .map(|city| Location {
                name: city.name.clone(),
                region: None,
                country: city.country.clone(),
                latitude: city.latitude,
                longitude: city.longitude,
            })
            .collect();

        tracing::info!(
            "Dashboard ready: geocoding={}, forecast={}",
            config.weather.geocoding_url,
            config.weather.forecast_url
        );

        Ok(Self {
            geocoder,
            provider,
            debouncer: SearchDebouncer::new(Duration::from_millis(config.search.debounce_ms)),
            state: Arc::new(Mutex::new(AppState::new(ThemeMode::from_dark_mode(
                config.ui.dark_mode,
            )))),
            featured: Arc::new(featured),
            unit: config.weather.temperature_unit,
            min_query_len: config.search.min_query_len,
            position: position_from_config(&config.location),
        })
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.state.lock().clone()
    }

    pub fn featured_cities(&self) -> &[Location] {
        &self.featured
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Type-ahead search.
    ///
    /// Debounced: resolves to `None` when a newer keystroke superseded this
    /// one. Queries below the minimum length clear results at once.
    pub async fn search(&self, query: &str) -> Option<Vec<Location>> {
        if query.trim().chars().count() < self.min_query_len {
            self.debouncer.cancel();
            return Some(Vec::new());
        }

        let geocoder = self.geocoder.clone();
        let query = query.to_string();
        self.debouncer
            .run(move || async move { geocoder.search(&query).await })
            .await
    }

    /// Select a place and fetch its forecast.
    ///
    /// Refused with `Busy` while another fetch is loading. On failure the
    /// previously shown forecast stays and the state carries the error message.
    #[tracing::instrument(skip(self, location), fields(city = %location.name))]
    pub async fn select_location(&self, location: Location) -> Result<(), AppError> {
        // Pending search results are stale once a place is picked
        self.debouncer.cancel();

        let location = {
            let mut state = self.state.lock();
            if !state.select_location(location) {
                tracing::debug!("Fetch already in progress, ignoring selection");
                return Err(WeatherServiceError::Busy.into());
            }
            state
                .fetch_start()
                .ok_or(AppError::Weather(WeatherServiceError::Busy))?
        };

        let mut guard = FetchGuard {
            state: &self.state,
            armed: true,
        };
        let result = self.provider.fetch_location(&location).await;
        guard.armed = false;

        let mut state = self.state.lock();
        match result {
            Ok(bundle) => {
                tracing::info!(
                    "Weather loaded for {}: {} days, {} hours",
                    location.name,
                    bundle.daily.len(),
                    bundle.hourly.len()
                );
                state.fetch_success(bundle);
                Ok(())
            }
            Err(e) => {
                let err = fetch_error(e);
                tracing::error!("Weather fetch failed for {}: {}", location.name, err);
                state.fetch_failure(err.user_message());
                Err(err)
            }
        }
    }

    /// Load the first featured city. No-op when none are configured.
    pub async fn load_initial(&self) -> Result<(), AppError> {
        match self.featured.first() {
            Some(city) => self.select_location(city.clone()).await,
            None => {
                tracing::debug!("No featured cities configured");
                Ok(())
            }
        }
    }

    /// "Use my location": resolve the device position and fetch its forecast.
    pub async fn use_current_position<P: PositionSource>(&self, source: &P) -> Result<(), AppError> {
        match resolve_current_position(source, &self.geocoder).await {
            Ok(location) => self.select_location(location).await,
            Err(e) => {
                let err = location_error(e);
                tracing::warn!("Current position unavailable: {}", err);
                self.state.lock().report_error(err.user_message());
                Err(err)
            }
        }
    }

    /// "Use my location" with the position pinned in config, if any.
    pub async fn use_configured_position(&self) -> Result<(), AppError> {
        match self.position {
            Some(position) => self.use_current_position(&position).await,
            None => self.use_current_position(&NoPositionSource).await,
        }
    }

    pub fn toggle_theme(&self) -> ThemeMode {
        self.state.lock().toggle_theme()
    }

    pub fn select_day(&self, day: usize) -> bool {
        self.state.lock().select_day(day)
    }

    pub fn clear_error(&self) {
        self.state.lock().clear_error();
    }

    pub fn view(&self) -> DashboardView {
        self.view_at(Utc::now())
    }

    /// Render the state as seen at `now`.
    pub fn view_at(&self, now: DateTime<Utc>) -> DashboardView {
        let state = self.state.lock();
        let forecast = match (state.location(), state.weather()) {
            (Some(location), Some(bundle)) => Some(forecast_view(
                location,
                bundle,
                state.selected_day(),
                self.unit,
                now,
            )),
            _ => None,
        };

        DashboardView {
            theme: state.theme(),
            loading: state.is_loading(),
            error: state.error().map(str::to_string),
            forecast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxdash_core::FeaturedCity;

    #[test]
    fn position_from_partial_config_is_none() {
        let half = LocationConfig {
            latitude: Some(1.0),
            longitude: None,
        };
        assert!(position_from_config(&half).is_none());

        let full = LocationConfig {
            latitude: Some(42.36),
            longitude: Some(-71.06),
        };
        let pos = position_from_config(&full).unwrap();
        assert_eq!(pos.0.latitude, 42.36);
    }

    #[test]
    fn from_config_applies_settings() {
        let mut config = Config::default();
        config.ui.dark_mode = false;
        config.weather.temperature_unit = TemperatureUnit::Celsius;

        let dashboard = Dashboard::from_config(&config).unwrap();
        assert_eq!(dashboard.state().theme(), ThemeMode::Light);
        assert_eq!(dashboard.temperature_unit(), TemperatureUnit::Celsius);
        assert_eq!(dashboard.featured_cities().len(), 5);
        assert_eq!(dashboard.featured_cities()[0].name, "Los Angeles");
        assert!(dashboard.view().forecast.is_none());
    }

    #[test]
    fn from_config_rejects_invalid() {
        let mut config = Config::default();
        config.weather.forecast_url = "not a url".into();
        let result = Dashboard::from_config(&config);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn theme_and_day_go_through_state() {
        let config = Config {
            featured_cities: vec![FeaturedCity {
                name: "Boston".into(),
                country: "US".into(),
                latitude: 42.36,
                longitude: -71.06,
            }],
            ..Config::default()
        };
        let dashboard = Dashboard::from_config(&config).unwrap();

        assert_eq!(dashboard.toggle_theme(), ThemeMode::Light);
        assert!(dashboard.select_day(4));
        assert!(!dashboard.select_day(9));
        assert_eq!(dashboard.state().selected_day(), 4);
        assert_eq!(dashboard.view().theme, ThemeMode::Light);
    }

    #[tokio::test]
    async fn short_query_clears_without_request() {
        let dashboard = Dashboard::from_config(&Config::default()).unwrap();
        assert_eq!(dashboard.search("B").await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn missing_position_reports_error() {
        let dashboard = Dashboard::from_config(&Config::default()).unwrap();
        let err = dashboard.use_configured_position().await.unwrap_err();
        assert!(matches!(err, AppError::Location(_)));
        assert_eq!(
            dashboard.state().error(),
            Some("Your location is unavailable. Search for a city instead.")
        );
    }
}
