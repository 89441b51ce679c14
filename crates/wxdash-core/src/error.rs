//! Centralized error types for the dashboard.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling across the crates
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Domain errors from the weather crate are mapped into this type by the
/// dashboard layer. Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherServiceError),

    #[error("Location error: {0}")]
    Location(#[from] LocationServiceError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
        }
    }
}

/// Classified transport failure, kept as the detail of a failed fetch.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Weather service errors as seen by the dashboard.
#[derive(Debug, Error)]
pub enum WeatherServiceError {
    /// Forecast could not be fetched (transport, HTTP status, or bad payload).
    #[error("Weather fetch failed: {0}")]
    FetchFailed(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// A fetch is already running; the new request was not started.
    #[error("Weather fetch already in progress")]
    Busy,
}

impl WeatherServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherServiceError::FetchFailed(_) => {
                "Failed to fetch weather data for selected location"
            }
            WeatherServiceError::InvalidCoordinates(_) => {
                "That location has invalid coordinates. Pick another city."
            }
            WeatherServiceError::Busy => "Still loading the previous forecast.",
        }
    }
}

/// Device location errors.
#[derive(Debug, Error)]
pub enum LocationServiceError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

impl LocationServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationServiceError::PermissionDenied => {
                "Location access was denied. Search for a city instead."
            }
            LocationServiceError::Unavailable(_) => {
                "Your location is unavailable. Search for a city instead."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Config(ConfigError::ParseError("test".into())),
            AppError::Weather(WeatherServiceError::FetchFailed("test".into())),
            AppError::Weather(WeatherServiceError::Busy),
            AppError::Location(LocationServiceError::PermissionDenied),
            AppError::Location(LocationServiceError::Unavailable("gps".into())),
        ];

        for e in errors {
            assert!(!e.user_message().is_empty(), "empty message for {:?}", e);
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let err: AppError = LocationServiceError::PermissionDenied.into();
        assert!(matches!(
            err,
            AppError::Location(LocationServiceError::PermissionDenied)
        ));
    }

    #[test]
    fn test_fetch_failure_message_is_generic() {
        let a = AppError::Weather(WeatherServiceError::FetchFailed("timeout".into()));
        let b = AppError::Weather(WeatherServiceError::FetchFailed("HTTP 500".into()));
        assert_eq!(a.user_message(), b.user_message());
        assert_eq!(
            a.user_message(),
            "Failed to fetch weather data for selected location"
        );
    }

    #[test]
    fn test_network_error_display_keeps_detail() {
        let err = NetworkError::ServerError {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.to_string(), "Server error: 503 - down");
        assert_eq!(NetworkError::Timeout.to_string(), "Request timed out");
    }
}
