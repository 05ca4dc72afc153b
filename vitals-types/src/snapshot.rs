use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{Metric, MetricSeries};

/// One reference timestamp with the aligned value of every metric (`None` if no
/// sample was close enough).
///
/// Serializes flat: `{"ts": 0, "hr": 71.0, "spo2": null, "resp": 14.2}`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPoint {
    /// Reference timestamp in epoch milliseconds.
    pub ts_ms: i64,
    /// Aligned value per metric.
    pub values: BTreeMap<Metric, Option<f64>>,
}

impl JoinedPoint {
    /// Aligned value for `metric`, flattening "absent" and "no sample in tolerance".
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied().flatten()
    }
}

impl Serialize for JoinedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("ts", &self.ts_ms)?;
        for (metric, value) in &self.values {
            map.serialize_entry(metric.key(), value)?;
        }
        map.end()
    }
}

/// One consistent bundle of metric series plus provenance metadata.
///
/// Immutable once built: a refresh produces a new `Snapshot` rather than
/// mutating an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    series: BTreeMap<Metric, Option<MetricSeries>>,
    timeline: Vec<JoinedPoint>,
    is_synthetic: bool,
    diagnostic: Option<String>,
    generated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Snapshot built from real provider data. `None` marks a metric whose fetch failed.
    #[must_use]
    pub fn live(
        series: BTreeMap<Metric, Option<MetricSeries>>,
        timeline: Vec<JoinedPoint>,
    ) -> Self {
        Self {
            series,
            timeline,
            is_synthetic: false,
            diagnostic: None,
            generated_at: Utc::now(),
        }
    }

    /// Snapshot of generated data, tagged with the failure that caused it.
    pub fn synthetic(
        series: BTreeMap<Metric, Option<MetricSeries>>,
        timeline: Vec<JoinedPoint>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            series,
            timeline,
            is_synthetic: true,
            diagnostic: Some(diagnostic.into()),
            generated_at: Utc::now(),
        }
    }

    /// Copy of this snapshot carrying `diagnostic`; data and provenance are unchanged.
    #[must_use]
    pub fn with_diagnostic(&self, diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: Some(diagnostic.into()),
            ..self.clone()
        }
    }

    /// Series for `metric`; `None` if it was not requested or its fetch failed.
    #[must_use]
    pub fn series(&self, metric: Metric) -> Option<&MetricSeries> {
        self.series.get(&metric).and_then(Option::as_ref)
    }

    /// All requested metrics with their series (or `None` on failure).
    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<Metric, Option<MetricSeries>> {
        &self.series
    }

    /// Series aligned on the primary metric's timestamps.
    #[must_use]
    pub fn timeline(&self) -> &[JoinedPoint] {
        &self.timeline
    }

    /// True when the data was generated rather than fetched.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }

    /// Failure that led to this snapshot being synthetic or stale.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Construction time.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}
