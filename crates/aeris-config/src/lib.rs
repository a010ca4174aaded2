//! Shared configuration for the aeris CLI.
//!
//! TOML config file with `AERIS_*` environment overrides (figment),
//! credential resolution (inline key or named env var), and translation
//! to `aeris_core::PollerConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aeris_core::{Location, PollerConfig};

/// Prefix for environment overrides: `AERIS_LATITUDE`, `AERIS_API_KEY`, ...
pub const ENV_PREFIX: &str = "AERIS_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured (set `api_key` in the config file, point \
             `api_key_env` at an environment variable, or export AERIS_API_KEY)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// On-disk configuration. Every field can also arrive via `AERIS_*` env
/// vars; env wins over file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// API key stored inline. Prefer `api_key_env` for shared machines.
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    pub api_key_env: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// BCP-47 language code for recommendation text.
    #[serde(default = "default_language")]
    pub language: String,

    /// Polling cadence in minutes.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_minutes: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            latitude: None,
            longitude: None,
            language: default_language(),
            scan_interval_minutes: default_scan_interval(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_language() -> String {
    "en".into()
}
fn default_scan_interval() -> u64 {
    5
}
fn default_timeout() -> u64 {
    30
}

// ── Paths ───────────────────────────────────────────────────────────

/// Platform config file location (`~/.config/aeris/config.toml` on Linux).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "aeris").map_or_else(
        || PathBuf::from("aeris.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Load / save ─────────────────────────────────────────────────────

/// Load from the default path, merged with env overrides.
pub fn load() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

/// Load a specific file, merged with env overrides. A missing file is
/// fine: defaults plus env.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config)
}

/// Write to the default path, creating parent directories.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_to(config, &config_path())
}

pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

/// Resolve the API key: inline value first, then the named env var.
pub fn resolve_api_key(config: &Config) -> Result<SecretString, ConfigError> {
    if let Some(key) = config.api_key.as_deref() {
        if !key.trim().is_empty() {
            return Ok(SecretString::from(key.to_owned()));
        }
    }
    if let Some(var) = config.api_key_env.as_deref() {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                return Ok(SecretString::from(value));
            }
        }
    }
    Err(ConfigError::NoCredentials)
}

/// Translate the on-disk config into a runtime `PollerConfig`.
///
/// Field-presence and basic range checks happen here; the coordinator
/// re-validates everything on construction.
pub fn resolve(config: &Config) -> Result<PollerConfig, ConfigError> {
    let api_key = resolve_api_key(config)?;

    let latitude = config
        .latitude
        .ok_or_else(|| invalid("latitude", "missing (run `aeris config init`)"))?;
    let longitude = config
        .longitude
        .ok_or_else(|| invalid("longitude", "missing (run `aeris config init`)"))?;

    if config.scan_interval_minutes == 0 {
        return Err(invalid("scan_interval_minutes", "must be at least 1"));
    }
    if config.timeout_secs == 0 {
        return Err(invalid("timeout_secs", "must be at least 1"));
    }

    Ok(PollerConfig {
        api_key,
        location: Location::new(latitude, longitude),
        language: config.language.clone(),
        refresh_interval: Duration::from_secs(config.scan_interval_minutes * 60),
        timeout: Duration::from_secs(config.timeout_secs),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn base_config() -> Config {
        Config {
            api_key: Some("file-key".into()),
            latitude: Some(52.52),
            longitude: Some(13.405),
            ..Config::default()
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            scan_interval_minutes: 10,
            language: "de".into(),
            ..base_config()
        };
        save_to(&config, &path).unwrap();

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("file-key"));
        assert_eq!(loaded.latitude, Some(52.52));
        assert_eq!(loaded.scan_interval_minutes, 10);
        assert_eq!(loaded.language, "de");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.language, "en");
        assert_eq!(loaded.scan_interval_minutes, 5);
        assert!(loaded.api_key.is_none());
    }

    #[test]
    fn resolve_builds_poller_config() {
        let resolved = resolve(&base_config()).unwrap();
        assert_eq!(resolved.api_key.expose_secret(), "file-key");
        assert_eq!(resolved.location.latitude, 52.52);
        assert_eq!(resolved.refresh_interval, Duration::from_secs(300));
    }

    #[test]
    fn resolve_requires_coordinates() {
        let config = Config {
            latitude: None,
            ..base_config()
        };
        assert!(matches!(
            resolve(&config),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn resolve_rejects_zero_interval() {
        let config = Config {
            scan_interval_minutes: 0,
            ..base_config()
        };
        assert!(resolve(&config).is_err());
    }

    #[test]
    fn api_key_env_indirection() {
        // PATH is always set; good enough to exercise the lookup without
        // mutating the test process environment.
        let config = Config {
            api_key: None,
            api_key_env: Some("PATH".into()),
            ..base_config()
        };
        assert!(resolve_api_key(&config).is_ok());
    }

    #[test]
    fn missing_credentials_error() {
        let config = Config {
            api_key: None,
            api_key_env: Some("AERIS_TEST_DEFINITELY_UNSET".into()),
            ..base_config()
        };
        assert!(matches!(
            resolve_api_key(&config),
            Err(ConfigError::NoCredentials)
        ));
    }
}
