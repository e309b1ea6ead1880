use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use puv_catalog::Coordinates;

/// Manila city center; the map opens here until a device fix arrives.
pub const INITIAL_LATITUDE: f64 = 14.5995;
pub const INITIAL_LONGITUDE: f64 = 120.9842;
pub const DEFAULT_DELTA: f64 = 0.02;

/// Visible map window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn initial() -> Self {
        Self {
            latitude: INITIAL_LATITUDE,
            longitude: INITIAL_LONGITUDE,
            latitude_delta: DEFAULT_DELTA,
            longitude_delta: DEFAULT_DELTA,
        }
    }

    /// Recenter on a position, keeping the initial zoom.
    pub fn centered_on(position: Coordinates) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            ..Self::initial()
        }
    }

    /// Stretch the longitude span to a viewport's width/height ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.longitude_delta = self.latitude_delta * aspect_ratio;
        }
        self
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LocationError {
    #[error("Location permission is required to show nearby vehicles.")]
    PermissionDenied,

    #[error("Failed to get location: {0}")]
    Unavailable(String),
}

/// Device position source.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Fixed position, or a denied permission when `None`.
pub struct StaticLocationProvider {
    position: Option<Coordinates>,
}

impl StaticLocationProvider {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        match self.position {
            Some(position) if position.is_valid() => Ok(position),
            Some(position) => Err(LocationError::Unavailable(format!(
                "invalid fix ({}, {})",
                position.latitude, position.longitude
            ))),
            None => Err(LocationError::PermissionDenied),
        }
    }
}

/// Region for the map: centered on the device when possible, else the initial one.
pub async fn resolve_region(provider: &dyn LocationProvider) -> Region {
    match provider.current_position().await {
        Ok(position) => Region::centered_on(position),
        Err(e) => {
            tracing::warn!("Falling back to initial map region: {}", e);
            Region::initial()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_region_follows_device() {
        let provider = StaticLocationProvider::new(Some(Coordinates::new(14.5547, 121.0244)));
        let region = resolve_region(&provider).await;
        assert_eq!(region.latitude, 14.5547);
        assert_eq!(region.longitude, 121.0244);
        assert_eq!(region.latitude_delta, DEFAULT_DELTA);
    }

    #[tokio::test]
    async fn test_region_falls_back_when_denied() {
        let provider = StaticLocationProvider::new(None);
        assert_eq!(provider.current_position().await, Err(LocationError::PermissionDenied));
        assert_eq!(resolve_region(&provider).await, Region::initial());

        let broken = StaticLocationProvider::new(Some(Coordinates::new(200.0, 0.0)));
        assert_eq!(resolve_region(&broken).await, Region::initial());
    }

    #[test]
    fn test_aspect_ratio() {
        let region = Region::initial().with_aspect_ratio(0.5);
        assert!((region.longitude_delta - 0.01).abs() < 1e-12);
        assert_eq!(Region::initial().with_aspect_ratio(0.0), Region::initial());
    }
}
