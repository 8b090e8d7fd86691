//! Best-effort device location.

use std::time::Duration;

use async_trait::async_trait;
use nutriaura_client::GeoLocation;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location is not supported on this device")]
    Unsupported,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LocationProvider: Send + Sync + 'static {
    async fn current_location(&self) -> Result<GeoLocation, LocationError>;
}

/// A device without location support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_location(&self) -> Result<GeoLocation, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Always reports the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoLocation);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<GeoLocation, LocationError> {
        Ok(self.0)
    }
}

/// Ask `provider` for a position, giving up after `timeout`. Never fails:
/// every problem is logged and reported as `None`.
pub async fn resolve_location(
    provider: &dyn LocationProvider,
    timeout: Duration,
) -> Option<GeoLocation> {
    match tokio::time::timeout(timeout, provider.current_location()).await {
        Ok(Ok(location)) => Some(location),
        Ok(Err(e)) => {
            warn!(error = %e, "continuing without location");
            None
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "location lookup timed out; continuing without location");
            None
        }
    }
}
