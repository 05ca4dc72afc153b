use serde::{Deserialize, Serialize};

/// One timestamped sample. Serialized as a `[ts_ms, value]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct MetricPoint {
    /// Sample time in epoch milliseconds.
    pub ts_ms: i64,
    /// Sample value in the metric's unit.
    pub value: f64,
}

impl MetricPoint {
    /// Construct a point.
    #[must_use]
    pub const fn new(ts_ms: i64, value: f64) -> Self {
        Self { ts_ms, value }
    }
}

impl From<(i64, f64)> for MetricPoint {
    fn from((ts_ms, value): (i64, f64)) -> Self {
        Self { ts_ms, value }
    }
}

impl From<MetricPoint> for (i64, f64) {
    fn from(p: MetricPoint) -> Self {
        (p.ts_ms, p.value)
    }
}

/// Samples of one metric, ordered by timestamp ascending as delivered by the provider.
///
/// The provider is expected not to repeat timestamps. Ordering and duplicates are
/// not enforced here; consumers that need a clean series normalize it first
/// (duplicates resolve last-write-wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSeries {
    points: Vec<MetricPoint>,
}

impl MetricSeries {
    /// Wrap provider points as-is.
    #[must_use]
    pub const fn new(points: Vec<MetricPoint>) -> Self {
        Self { points }
    }

    /// Build a series from `(ts_ms, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        Self {
            points: pairs.into_iter().map(MetricPoint::from).collect(),
        }
    }

    /// Borrow the points.
    #[must_use]
    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<&MetricPoint> {
        self.points.last()
    }

    /// True when timestamps are strictly increasing.
    #[must_use]
    pub fn is_strictly_increasing(&self) -> bool {
        self.points.windows(2).all(|w| w[0].ts_ms < w[1].ts_ms)
    }
}

impl FromIterator<MetricPoint> for MetricSeries {
    fn from_iter<T: IntoIterator<Item = MetricPoint>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
