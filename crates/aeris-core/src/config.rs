// ── Runtime polling configuration ──
//
// These types describe *what* to poll and how often. They carry the
// credential and tuning values but never touch disk -- the CLI (via
// aeris-config) constructs a `PollerConfig` and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Geographic point the poller reports on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both coordinates finite and within WGS84 bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(CoreError::config("latitude/longitude must be finite numbers"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::config(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::config(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Configuration for one polling coordinator.
///
/// Built by the caller, validated by `Coordinator::new` -- core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Google Air Quality API key.
    pub api_key: SecretString,
    /// Coordinates to look up.
    pub location: Location,
    /// BCP-47 language code for recommendation text.
    pub language: String,
    /// How often the background task refreshes.
    pub refresh_interval: Duration,
    /// Hard bound on each outbound call.
    pub timeout: Duration,
}

impl PollerConfig {
    /// Validate every field; the coordinator refuses to start otherwise.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(CoreError::config("API key must not be empty"));
        }
        self.location.validate()?;
        if self.language.trim().is_empty() {
            return Err(CoreError::config("language must not be empty"));
        }
        if self.refresh_interval.is_zero() {
            return Err(CoreError::config("refresh interval must be positive"));
        }
        if self.timeout.is_zero() {
            return Err(CoreError::config("request timeout must be positive"));
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(String::new()),
            location: Location::new(0.0, 0.0),
            language: "en".into(),
            refresh_interval: Duration::from_secs(300),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_config() -> PollerConfig {
        PollerConfig {
            api_key: SecretString::from("key".to_string()),
            location: Location::new(52.52, 13.405),
            ..PollerConfig::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        valid_config().validate().unwrap();
    }

    #[test]
    fn boundary_coordinates_pass() {
        for (lat, lon) in [(90.0, 180.0), (-90.0, -180.0), (0.0, 0.0)] {
            let cfg = PollerConfig {
                location: Location::new(lat, lon),
                ..valid_config()
            };
            cfg.validate().unwrap();
        }
    }

    #[test]
    fn out_of_range_coordinates_fail() {
        for (lat, lon) in [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.1), (0.0, -200.0)] {
            let cfg = PollerConfig {
                location: Location::new(lat, lon),
                ..valid_config()
            };
            assert!(cfg.validate().is_err(), "({lat}, {lon}) should fail");
        }
    }

    #[test]
    fn non_finite_coordinates_fail() {
        for (lat, lon) in [(f64::NAN, 0.0), (0.0, f64::INFINITY), (f64::NEG_INFINITY, 0.0)] {
            let cfg = PollerConfig {
                location: Location::new(lat, lon),
                ..valid_config()
            };
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn empty_api_key_fails() {
        let cfg = PollerConfig {
            api_key: SecretString::from("  ".to_string()),
            ..valid_config()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn zero_interval_fails() {
        let cfg = PollerConfig {
            refresh_interval: Duration::ZERO,
            ..valid_config()
        };
        assert!(cfg.validate().is_err());
    }
}
