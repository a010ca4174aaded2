// ── Normalized metric records ──
//
// One `FetchResult` per refresh: a flat, ordered mapping from metric key
// to a tagged value record. All missing-field defaulting happens during
// normalization (`convert`); nothing downstream re-inspects raw payloads.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::descriptor::SensorKind;

/// A single metric observation.
///
/// `Unknown` is the sentinel for "the category was present but carried no
/// usable value" -- it replaces ad-hoc `"Unknown"` strings at the edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricReading {
    Number(f64),
    Text(String),
    Unknown,
}

impl MetricReading {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetricReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Tagged value record for one metric key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    pub reading: MetricReading,
    /// Unit string as reported upstream (absent for indexes and text).
    pub unit: Option<String>,
    /// Provenance tag assigned during normalization.
    pub kind: SensorKind,
    /// Auxiliary detail: category, dominant pollutant, sources, effects...
    pub metadata: BTreeMap<String, String>,
}

impl MetricValue {
    pub fn new(reading: MetricReading, kind: SensorKind) -> Self {
        Self {
            reading,
            unit: None,
            kind,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }
}

/// The flat metric mapping produced by one successful refresh.
///
/// Ordered (`BTreeMap`) so iteration, rendering, and tests are
/// deterministic. The key set is open-ended and may grow between fetches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchResult {
    metrics: BTreeMap<String, MetricValue>,
    /// Upstream observation timestamp, when the response carried one.
    pub observed_at: Option<DateTime<Utc>>,
}

impl FetchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetricValue) {
        self.metrics.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.metrics.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.metrics.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
