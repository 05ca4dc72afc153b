//! Plausible synthetic data for when no real snapshot can be produced.
//!
//! This is the last line of defense of the gateway, so everything here is pure
//! computation with no failure path: degenerate configuration is clamped rather
//! than rejected.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;

use crate::timeseries::join::join_series;
use crate::{FallbackConfig, Metric, MetricPoint, MetricSeries, Snapshot};

/// Inclusive-exclusive value range a synthetic sample of `metric` is drawn from.
#[must_use]
pub const fn plausible_range(metric: Metric) -> (f64, f64) {
    match metric {
        Metric::HeartRate => (65.0, 85.0),
        Metric::Spo2 => (95.0, 99.0),
        Metric::Respiration => (12.0, 18.0),
    }
}

fn sample<R: Rng + ?Sized>(metric: Metric, rng: &mut R) -> f64 {
    let (lo, hi) = plausible_range(metric);
    let v = rng.random_range(lo..hi);
    match metric {
        // Whole beats per minute, like the provider reports them.
        Metric::HeartRate => v.floor(),
        Metric::Spo2 | Metric::Respiration => (v * 10.0).floor() / 10.0,
    }
}

/// Builds synthetic snapshots tagged with the failure that made them necessary.
#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    cfg: FallbackConfig,
    metrics: Vec<Metric>,
    primary: Metric,
    tolerance_ms: u64,
}

impl FallbackGenerator {
    /// Create a generator for `metrics`; `primary` is always generated and drives the timeline.
    #[must_use]
    pub fn new(cfg: FallbackConfig, metrics: &[Metric], primary: Metric) -> Self {
        let mut all = vec![primary];
        for m in metrics {
            if !all.contains(m) {
                all.push(*m);
            }
        }
        let interval_ms = u64::try_from(cfg.interval.as_millis()).unwrap_or(u64::MAX);
        Self {
            cfg,
            metrics: all,
            primary,
            tolerance_ms: interval_ms,
        }
    }

    /// Generate a snapshot ending now with thread-local randomness.
    pub fn generate(&self, diagnostic: impl Into<String>) -> Snapshot {
        let now_ms = Utc::now().timestamp_millis();
        self.generate_with(now_ms, &mut rand::rng(), diagnostic)
    }

    /// Generate a snapshot whose series end at `now_ms`, drawing values from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        now_ms: i64,
        rng: &mut R,
        diagnostic: impl Into<String>,
    ) -> Snapshot {
        let points = self.cfg.points.max(1);
        let step = i64::try_from(self.cfg.interval.as_millis())
            .unwrap_or(i64::MAX)
            .max(1);

        let mut series = BTreeMap::new();
        for metric in &self.metrics {
            let s: MetricSeries = (0..points)
                .map(|i| {
                    let back = i64::try_from(points - 1 - i).unwrap_or(i64::MAX);
                    let ts = now_ms.saturating_sub(back.saturating_mul(step));
                    MetricPoint::new(ts, sample(*metric, rng))
                })
                .collect();
            series.insert(*metric, Some(s));
        }

        let timeline = join_series(self.primary, &series, self.tolerance_ms);
        let diagnostic = diagnostic.into();
        #[cfg(feature = "tracing")]
        tracing::debug!(points, reason = %diagnostic, "generated synthetic snapshot");
        Snapshot::synthetic(series, timeline, diagnostic)
    }
}
