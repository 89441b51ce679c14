use wxdash_core::{
    AppError, ConfigError, LocationServiceError, NetworkError, ReqwestErrorExt,
    WeatherServiceError,
};
use wxdash_weather::{LocationError, WeatherError};

/// Forecast fetch failure as shown to the user.
///
/// Everything except bad coordinates collapses into `FetchFailed`, which
/// carries the generic "Failed to fetch weather data" message; the detail is
/// kept for logs.
pub fn fetch_error(e: WeatherError) -> AppError {
    let detail = match e {
        WeatherError::InvalidCoordinates {
            latitude,
            longitude,
        } => {
            return AppError::Weather(WeatherServiceError::InvalidCoordinates(format!(
                "{}, {}",
                latitude, longitude
            )))
        }
        WeatherError::Network(err) => err.into_network_error().to_string(),
        WeatherError::Http { status, message } => {
            NetworkError::ServerError { status, message }.to_string()
        }
        WeatherError::Parse(msg) => NetworkError::InvalidResponse(msg).to_string(),
    };
    AppError::Weather(WeatherServiceError::FetchFailed(detail))
}

pub fn location_error(e: LocationError) -> AppError {
    match e {
        LocationError::PermissionDenied => AppError::Location(LocationServiceError::PermissionDenied),
        other => AppError::Location(LocationServiceError::Unavailable(other.to_string())),
    }
}

/// HTTP client construction failure at startup.
pub fn client_error(e: WeatherError) -> AppError {
    AppError::Config(ConfigError::Invalid(format!("HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_maps_to_generic_message() {
        let err = fetch_error(WeatherError::Http {
            status: 503,
            message: "Service Unavailable".into(),
        });
        assert!(matches!(
            err,
            AppError::Weather(WeatherServiceError::FetchFailed(_))
        ));
        assert_eq!(
            err.user_message(),
            "Failed to fetch weather data for selected location"
        );
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn parse_failure_maps_to_fetch_failed() {
        let err = fetch_error(WeatherError::Parse("missing daily".into()));
        assert!(err.to_string().contains("missing daily"));
        assert_eq!(
            err.user_message(),
            "Failed to fetch weather data for selected location"
        );
    }

    #[test]
    fn invalid_coordinates_kept_distinct() {
        let err = fetch_error(WeatherError::InvalidCoordinates {
            latitude: 120.0,
            longitude: 0.0,
        });
        assert!(matches!(
            err,
            AppError::Weather(WeatherServiceError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn location_errors() {
        assert!(matches!(
            location_error(LocationError::PermissionDenied),
            AppError::Location(LocationServiceError::PermissionDenied)
        ));
        assert!(matches!(
            location_error(LocationError::Timeout),
            AppError::Location(LocationServiceError::Unavailable(_))
        ));
        let err = location_error(LocationError::NotFound {
            latitude: 1.0,
            longitude: 2.0,
        });
        assert!(err.to_string().contains("No place found"));
    }
}
