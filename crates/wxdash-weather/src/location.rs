//! Device position and "use my location" resolution.

use std::future::Future;

use crate::geocode::GeocodingClient;
use crate::types::{Coordinates, Location, LocationError};

/// Host platform geolocation.
pub trait PositionSource: Send + Sync {
    /// Current device coordinates, or why they are unavailable.
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Position pinned in configuration, for hosts without a geolocation service.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        if self.0.is_valid() {
            Ok(self.0)
        } else {
            tracing::warn!(
                "Configured position {}, {} is out of range",
                self.0.latitude,
                self.0.longitude
            );
            Err(LocationError::ServiceUnavailable)
        }
    }
}

/// Platform without any geolocation support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionSource;

impl PositionSource for NoPositionSource {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Resolve the device position to a named place.
///
/// Fails when the platform refuses or cannot provide coordinates, or when the
/// reverse lookup finds nothing.
pub async fn resolve_current_position<P: PositionSource>(
    source: &P,
    geocoder: &GeocodingClient,
) -> Result<Location, LocationError> {
    let coords = source.current_position().await.map_err(|e| {
        tracing::info!("Device position unavailable: {}", e);
        e
    })?;
    tracing::debug!("Device position: {}, {}", coords.latitude, coords.longitude);
    geocoder.reverse(coords).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct DeniedPosition;

    impl PositionSource for DeniedPosition {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    fn geocoder(base: &str) -> GeocodingClient {
        GeocodingClient::new(&format!("{}/v1/search", base), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_permission_denied_skips_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = resolve_current_position(&DeniedPosition, &geocoder(&server.uri()))
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[tokio::test]
    async fn test_no_platform_support() {
        let err = resolve_current_position(&NoPositionSource, &geocoder("http://127.0.0.1:9"))
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::ServiceUnavailable));
    }

    #[tokio::test]
    async fn test_fixed_position_out_of_range() {
        let source = FixedPosition(Coordinates::new(120.0, 0.0));
        assert!(source.current_position().await.is_err());
    }

    #[tokio::test]
    async fn test_fixed_position_resolves_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "name": "Seattle",
                    "admin1": "Washington",
                    "country_code": "US",
                    "latitude": 47.60621,
                    "longitude": -122.33207
                }]
            })))
            .mount(&server)
            .await;

        let source = FixedPosition(Coordinates::new(47.60621, -122.33207));
        let place = resolve_current_position(&source, &geocoder(&server.uri()))
            .await
            .unwrap();

        assert_eq!(place.name, "Seattle");
        assert_eq!(place.region.as_deref(), Some("Washington"));
        assert_eq!(place.latitude, 47.6062);
        assert_eq!(place.longitude, -122.3321);
    }
}
