use std::path::PathBuf;
use std::time::Duration;

use nutriaura_client::GeoLocation;

use crate::error::{AppError, AppResult};
use crate::orchestrator::DEFAULT_LOCATION_TIMEOUT;

pub const DEFAULT_DATA_DIR: &str = ".nutriaura";

/// Settings for the session host; the analysis client reads its own.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub location_timeout: Duration,
    pub fixed_location: Option<GeoLocation>,
}

fn parse<T: std::str::FromStr>(name: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::Config(format!("{name} is not a number: {raw}")))
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> AppResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let data_dir = get("NUTRIAURA_DATA_DIR")
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.into());
        let location_timeout = match get("NUTRIAURA_LOCATION_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse("NUTRIAURA_LOCATION_TIMEOUT_MS", &raw)?),
            None => DEFAULT_LOCATION_TIMEOUT,
        };
        let fixed_location = match (get("NUTRIAURA_LATITUDE"), get("NUTRIAURA_LONGITUDE")) {
            (Some(lat), Some(lon)) => {
                let latitude: f64 = parse("NUTRIAURA_LATITUDE", &lat)?;
                let longitude: f64 = parse("NUTRIAURA_LONGITUDE", &lon)?;
                if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                    return Err(AppError::Config(format!(
                        "location out of range: {latitude},{longitude}"
                    )));
                }
                Some(GeoLocation {
                    latitude,
                    longitude,
                })
            }
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "NUTRIAURA_LATITUDE and NUTRIAURA_LONGITUDE must be set together".into(),
                ));
            }
        };
        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            location_timeout,
            fixed_location,
        })
    }
}
