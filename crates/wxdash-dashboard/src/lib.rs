//! Weather dashboard presentation layer
//!
//! Application state, the search/select/fetch controller and the view models
//! a front end renders.

pub mod dashboard;
pub mod display;
pub mod error_mapping;
pub mod state;

pub use dashboard::{position_from_config, Dashboard, DashboardView};
pub use display::{
    day_label, forecast_view, hour_label, location_label, location_title, CurrentCard, DayCard,
    ForecastView, HourCard, TemperaturePair,
};
pub use state::{AppState, ThemeMode};
