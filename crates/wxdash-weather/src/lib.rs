//! Weather data for the dashboard
//!
//! Location search, forecast fetching and display windowing on top of the
//! Open-Meteo geocoding and forecast APIs.

pub mod debounce;
pub mod geocode;
mod http;
pub mod location;
pub mod provider;
pub mod types;
pub mod window;

pub use debounce::SearchDebouncer;
pub use geocode::GeocodingClient;
pub use location::{resolve_current_position, FixedPosition, NoPositionSource, PositionSource};
pub use provider::WeatherProvider;
pub use types::*;
