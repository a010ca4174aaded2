// ── API-to-domain normalization ──
//
// Flattens the nested `currentConditions` payload into the FetchResult
// mapping. This is the only place that inspects raw response structure;
// every missing-field default lives here. Total: any syntactically valid
// response normalizes without error.

use aeris_api::types::{AqiIndex, CurrentConditions, Pollutant};

use crate::model::{FetchResult, MetricReading, MetricValue, SensorKind};

/// Population groups every response is expanded to, `(api_name, key_suffix)`.
/// A group missing from a response still gets a metric, with default text,
/// so its sensor never vanishes.
pub const RECOMMENDATION_GROUPS: [(&str, &str); 7] = [
    ("generalPopulation", "general_population"),
    ("elderly", "elderly"),
    ("lungDiseasePopulation", "lung_disease_population"),
    ("heartDiseasePopulation", "heart_disease_population"),
    ("athletes", "athletes"),
    ("pregnantWomen", "pregnant_women"),
    ("children", "children"),
];

/// Default recommendation text for a missing population group.
pub const NO_RECOMMENDATION: &str = "No recommendation available.";

const KEY_DISPLAY_NAME: &str = "display_name";

/// Normalize a raw response into the flat metric mapping.
pub fn conditions_to_metrics(conditions: &CurrentConditions) -> FetchResult {
    let mut result = FetchResult::new();
    result.observed_at = conditions.date_time;

    for index in &conditions.indexes {
        result.insert(index.code.to_lowercase(), index_metric(index));
    }

    for pollutant in &conditions.pollutants {
        result.insert(pollutant.code.to_lowercase(), pollutant_metric(pollutant));
    }

    // Declared groups first, then anything new the service started sending.
    for (api_name, suffix) in RECOMMENDATION_GROUPS {
        let text = conditions
            .health_recommendations
            .get(api_name)
            .map_or(NO_RECOMMENDATION, String::as_str);
        result.insert(
            format!("recommendation_{suffix}"),
            MetricValue::new(MetricReading::Text(text.to_owned()), SensorKind::Recommendation),
        );
    }
    for (group, text) in &conditions.health_recommendations {
        if RECOMMENDATION_GROUPS.iter().any(|(api, _)| api == group) {
            continue;
        }
        result.insert(
            format!("recommendation_{}", snake_case(group)),
            MetricValue::new(MetricReading::Text(text.clone()), SensorKind::Recommendation),
        );
    }

    result
}

fn index_metric(index: &AqiIndex) -> MetricValue {
    #[allow(clippy::cast_precision_loss)]
    let reading = index
        .aqi
        .map_or(MetricReading::Unknown, |v| MetricReading::Number(v as f64));

    let mut value = MetricValue::new(reading, SensorKind::Index);
    if let Some(ref name) = index.display_name {
        value = value.with_metadata(KEY_DISPLAY_NAME, name.clone());
    }
    if let Some(ref category) = index.category {
        value = value.with_metadata("category", category.clone());
    }
    if let Some(ref dominant) = index.dominant_pollutant {
        value = value.with_metadata("dominant_pollutant", dominant.clone());
    }
    value
}

fn pollutant_metric(pollutant: &Pollutant) -> MetricValue {
    let (reading, unit) = match &pollutant.concentration {
        Some(c) => (
            c.value.map_or(MetricReading::Unknown, MetricReading::Number),
            c.units.clone(),
        ),
        None => (MetricReading::Unknown, None),
    };

    let mut value = MetricValue::new(reading, SensorKind::Pollutant).with_unit(unit);
    if let Some(name) = pollutant
        .display_name
        .as_ref()
        .or_else(|| pollutant.full_name.as_ref())
    {
        value = value.with_metadata(KEY_DISPLAY_NAME, name.clone());
    }
    if let Some(ref info) = pollutant.additional_info {
        if let Some(ref sources) = info.sources {
            value = value.with_metadata("sources", sources.clone());
        }
        if let Some(ref effects) = info.effects {
            value = value.with_metadata("effects", effects.clone());
        }
    }
    value
}

/// camelCase -> snake_case for recommendation group names.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
