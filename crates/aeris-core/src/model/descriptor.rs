// ── Sensor identity ──
//
// A SensorDescriptor is built exactly once, when the registry first sees a
// metric key. Reads never re-derive names or ids from raw payloads.

use serde::Serialize;

/// Which response category a metric came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// A named air-quality index (universal or local).
    Index,
    /// A pollutant concentration.
    Pollutant,
    /// A health recommendation for one population group.
    Recommendation,
}

/// Immutable identity for one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorDescriptor {
    /// Metric key this sensor tracks (e.g. `pm25`, `uaqi`,
    /// `recommendation_elderly`).
    pub key: String,
    /// Stable identifier for host-platform registration.
    pub unique_id: String,
    /// Human-readable label.
    pub name: String,
    pub kind: SensorKind,
}

impl SensorDescriptor {
    /// Build a descriptor from a metric key, its kind, and the upstream
    /// display name when one was reported.
    pub fn new(key: &str, kind: SensorKind, display_name: Option<&str>) -> Self {
        let name = match kind {
            SensorKind::Pollutant => display_name.map_or_else(
                || format!("{} Concentration", key.to_uppercase()),
                |n| format!("{n} Concentration"),
            ),
            SensorKind::Index => {
                display_name.map_or_else(|| key.to_uppercase(), str::to_owned)
            }
            SensorKind::Recommendation => {
                let group = key
                    .strip_prefix("recommendation_")
                    .unwrap_or(key)
                    .replace('_', " ");
                format!("Health Recommendation ({group})")
            }
        };

        Self {
            key: key.to_owned(),
            unique_id: format!("google_air_quality_{key}"),
            name,
            kind,
        }
    }
}

/// Service-level metadata shared by every sensor, mirroring what the host
/// platform shows as the owning device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub identifier: &'static str,
    pub name: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub configuration_url: &'static str,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            identifier: "google_air_quality",
            name: "Google Air Quality",
            manufacturer: "Google",
            model: "Air Quality API",
            configuration_url: "https://developers.google.com/maps/documentation/air-quality",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pollutant_name_uses_display_name() {
        let d = SensorDescriptor::new("pm25", SensorKind::Pollutant, Some("PM2.5"));
        assert_eq!(d.name, "PM2.5 Concentration");
        assert_eq!(d.unique_id, "google_air_quality_pm25");
    }

    #[test]
    fn pollutant_name_falls_back_to_key() {
        let d = SensorDescriptor::new("o3", SensorKind::Pollutant, None);
        assert_eq!(d.name, "O3 Concentration");
    }

    #[test]
    fn index_name_prefers_display_name() {
        let d = SensorDescriptor::new("uaqi", SensorKind::Index, Some("Universal AQI"));
        assert_eq!(d.name, "Universal AQI");

        let bare = SensorDescriptor::new("eaqi", SensorKind::Index, None);
        assert_eq!(bare.name, "EAQI");
    }

    #[test]
    fn recommendation_name_strips_prefix() {
        let d = SensorDescriptor::new(
            "recommendation_general_population",
            SensorKind::Recommendation,
            None,
        );
        assert_eq!(d.name, "Health Recommendation (general population)");
    }
}
