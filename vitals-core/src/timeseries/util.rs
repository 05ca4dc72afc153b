//! Shared helpers for point-series normalization and lookup.

use crate::MetricPoint;

/// Sort points by timestamp and collapse duplicate timestamps, keeping the
/// point that appeared last in the input (last write wins).
#[must_use]
pub fn normalize_points(points: &[MetricPoint]) -> Vec<MetricPoint> {
    let mut sorted = points.to_vec();
    // Stable sort: among equal timestamps the input order is kept.
    sorted.sort_by_key(|p| p.ts_ms);

    let mut out: Vec<MetricPoint> = Vec::with_capacity(sorted.len());
    for p in sorted {
        match out.last_mut() {
            Some(last) if last.ts_ms == p.ts_ms => *last = p,
            _ => out.push(p),
        }
    }
    out
}

/// Find the point of `sorted` closest to `ts_ms`, if it lies within `tolerance_ms`.
///
/// `sorted` must be ascending by timestamp (see [`normalize_points`]). When two
/// candidates are equally close the earlier one is returned. The tolerance is
/// inclusive.
#[must_use]
pub fn nearest_within(sorted: &[MetricPoint], ts_ms: i64, tolerance_ms: u64) -> Option<&MetricPoint> {
    let idx = sorted.partition_point(|p| p.ts_ms < ts_ms);
    let before = idx.checked_sub(1).and_then(|i| sorted.get(i));
    let after = sorted.get(idx);

    let best = match (before, after) {
        (Some(b), Some(a)) => {
            if b.ts_ms.abs_diff(ts_ms) <= a.ts_ms.abs_diff(ts_ms) {
                b
            } else {
                a
            }
        }
        (Some(p), None) | (None, Some(p)) => p,
        (None, None) => return None,
    };

    (best.ts_ms.abs_diff(ts_ms) <= tolerance_ms).then_some(best)
}
