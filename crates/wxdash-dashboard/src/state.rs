//! Dashboard application state.
//!
//! All mutation goes through the named transitions below, so the flow
//! select -> fetch start -> success/failure can be tested without a view.

use serde::{Deserialize, Serialize};
use wxdash_weather::window::DAILY_WINDOW_DAYS;
use wxdash_weather::{Location, WeatherBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    theme: ThemeMode,
    /// Location whose forecast is on screen
    location: Option<Location>,
    weather: Option<WeatherBundle>,
    /// Location chosen by the user, waiting for or being fetched
    pending: Option<Location>,
    selected_day: usize,
    loading: bool,
    error: Option<String>,
}

impl AppState {
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherBundle> {
        self.weather.as_ref()
    }

    pub fn pending(&self) -> Option<&Location> {
        self.pending.as_ref()
    }

    pub fn selected_day(&self) -> usize {
        self.selected_day
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The user picked a place. Refused while a fetch is running.
    pub fn select_location(&mut self, location: Location) -> bool {
        if self.loading {
            return false;
        }
        self.pending = Some(location);
        true
    }

    /// Begin fetching the pending location. Returns it, or `None` when there
    /// is nothing to fetch or a fetch is already running.
    pub fn fetch_start(&mut self) -> Option<Location> {
        if self.loading {
            return None;
        }
        let location = self.pending.clone()?;
        self.loading = true;
        self.error = None;
        Some(location)
    }

    /// The pending location's forecast arrived; it replaces what is shown.
    pub fn fetch_success(&mut self, weather: WeatherBundle) {
        if let Some(location) = self.pending.take() {
            self.location = Some(location);
        }
        self.weather = Some(weather);
        self.selected_day = 0;
        self.loading = false;
        self.error = None;
    }

    /// The fetch failed; previously shown data stays untouched.
    pub fn fetch_failure(&mut self, message: impl Into<String>) {
        self.pending = None;
        self.loading = false;
        self.error = Some(message.into());
    }

    /// The fetch was abandoned before it finished; nothing shown changes.
    pub fn fetch_cancelled(&mut self) {
        self.pending = None;
        self.loading = false;
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Pick a day in the seven-day strip. Out-of-range indexes are ignored.
    pub fn select_day(&mut self, day: usize) -> bool {
        if day >= DAILY_WINDOW_DAYS {
            return false;
        }
        self.selected_day = day;
        true
    }

    /// Show an error that did not come from a fetch (e.g. device location).
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
