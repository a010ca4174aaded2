// Response and request types for the `currentConditions:lookup` endpoint.
//
// Every response field is optional-tolerant: the service omits whole
// categories depending on the requested extra computations, and new
// top-level fields appear without notice. Unknown fields are ignored so a
// payload the client has never seen still deserializes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Request ─────────────────────────────────────────────────────────

/// Geographic point for the lookup request body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of a `currentConditions:lookup` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub universal_aqi: bool,
    pub location: LatLng,
    pub extra_computations: Vec<String>,
    pub language_code: String,
}

// ── Response ────────────────────────────────────────────────────────

/// Full `currentConditions:lookup` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Observation timestamp (RFC 3339).
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub region_code: Option<String>,

    /// Air-quality indexes (universal AQI plus any local index).
    #[serde(default)]
    pub indexes: Vec<AqiIndex>,

    /// Pollutant concentrations.
    #[serde(default)]
    pub pollutants: Vec<Pollutant>,

    /// Health recommendations keyed by population group
    /// (e.g. `generalPopulation`, `elderly`).
    #[serde(default)]
    pub health_recommendations: BTreeMap<String, String>,
}

/// One air-quality index (e.g. `uaqi`, a national index).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiIndex {
    pub code: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub aqi: Option<i64>,

    #[serde(default)]
    pub aqi_display: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub dominant_pollutant: Option<String>,
}

/// One measured pollutant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pollutant {
    pub code: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub concentration: Option<Concentration>,

    #[serde(default)]
    pub additional_info: Option<AdditionalInfo>,
}

/// Measured concentration with its unit string.
#[derive(Debug, Clone, Deserialize)]
pub struct Concentration {
    #[serde(default)]
    pub value: Option<f64>,

    #[serde(default)]
    pub units: Option<String>,
}

/// Free-text background information about a pollutant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    #[serde(default)]
    pub sources: Option<String>,

    #[serde(default)]
    pub effects: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_response() {
        let body = r#"{
            "dateTime": "2024-05-01T12:00:00Z",
            "regionCode": "de",
            "indexes": [
                {"code": "uaqi", "displayName": "Universal AQI", "aqi": 62,
                 "category": "Good air quality", "dominantPollutant": "pm25"}
            ],
            "pollutants": [
                {"code": "pm25", "displayName": "PM2.5",
                 "concentration": {"value": 11.5, "units": "MICROGRAMS_PER_CUBIC_METER"},
                 "additionalInfo": {"sources": "Combustion.", "effects": "Respiratory."}}
            ],
            "healthRecommendations": {"elderly": "Stay indoors."}
        }"#;

        let parsed: CurrentConditions = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.region_code.as_deref(), Some("de"));
        assert_eq!(parsed.indexes[0].aqi, Some(62));
        assert_eq!(parsed.pollutants[0].code, "pm25");
        assert_eq!(
            parsed.health_recommendations.get("elderly").unwrap(),
            "Stay indoors."
        );
    }

    #[test]
    fn tolerates_empty_object() {
        let parsed: CurrentConditions = serde_json::from_str("{}").unwrap();
        assert!(parsed.indexes.is_empty());
        assert!(parsed.pollutants.is_empty());
        assert!(parsed.health_recommendations.is_empty());
    }

    #[test]
    fn ignores_unknown_top_level_fields() {
        let body = r#"{"indexes": [], "somethingNew": {"nested": true}}"#;
        let parsed: CurrentConditions = serde_json::from_str(body).unwrap();
        assert!(parsed.indexes.is_empty());
    }

    #[test]
    fn pollutant_without_concentration() {
        let body = r#"{"pollutants": [{"code": "o3"}]}"#;
        let parsed: CurrentConditions = serde_json::from_str(body).unwrap();
        assert!(parsed.pollutants[0].concentration.is_none());
    }
}
