use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(LocationError::OutOfRange { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
    #[error("coordinates out of range: ({latitude}, {longitude})")]
    OutOfRange {
        latitude: f64,
        longitude: f64,
    },
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoPosition, LocationError>;
}

/// A position the user shared up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoPosition);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<GeoPosition, LocationError> {
        Ok(self.0)
    }
}

/// The user did not share a position.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<GeoPosition, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GeoPosition::new(39.9042, 116.4074).is_ok());
        assert!(GeoPosition::new(-90.0, 180.0).is_ok());
        assert!(matches!(GeoPosition::new(91.0, 0.0), Err(LocationError::OutOfRange { .. })));
        assert!(matches!(GeoPosition::new(0.0, -180.5), Err(LocationError::OutOfRange { .. })));
    }

    #[tokio::test]
    async fn providers_answer_as_configured() {
        let here = GeoPosition::new(30.0, 120.0).unwrap();
        assert_eq!(FixedLocation(here).current_position().await, Ok(here));
        assert_eq!(NoLocation.current_position().await, Err(LocationError::PermissionDenied));
    }
}
