use std::collections::BTreeMap;

use super::util::{nearest_within, normalize_points};
use crate::{JoinedPoint, Metric, MetricPoint, MetricSeries};

/// Align every series onto the timestamps of the `reference` series.
///
/// - The reference series is normalized (sorted, duplicate timestamps last-write-wins)
///   and each of its timestamps yields one [`JoinedPoint`].
/// - Every other metric contributes the value of its sample nearest to the
///   reference timestamp, if that sample lies within `tolerance_ms` (inclusive);
///   otherwise `None`. Equidistant candidates resolve to the earlier sample.
/// - Metrics mapped to `None` (failed fetches) contribute `None` everywhere.
/// - If the reference metric is absent or `None`, the timeline is empty.
///
/// ```
/// use std::collections::BTreeMap;
/// use vitals_core::{join_series, Metric, MetricSeries};
///
/// let mut series = BTreeMap::new();
/// series.insert(Metric::HeartRate, Some(MetricSeries::from_pairs([(0, 1.0), (60_000, 2.0)])));
/// series.insert(Metric::Spo2, Some(MetricSeries::from_pairs([(90_000, 9.0)])));
///
/// let timeline = join_series(Metric::HeartRate, &series, 60_000);
/// assert_eq!(timeline.len(), 2);
/// // 90 000 ms away: outside the tolerance.
/// assert_eq!(timeline[0].value(Metric::Spo2), None);
/// // 30 000 ms away: inside.
/// assert_eq!(timeline[1].value(Metric::Spo2), Some(9.0));
/// ```
#[must_use]
pub fn join_series(
    reference: Metric,
    series: &BTreeMap<Metric, Option<MetricSeries>>,
    tolerance_ms: u64,
) -> Vec<JoinedPoint> {
    let Some(Some(reference_series)) = series.get(&reference) else {
        return Vec::new();
    };
    let timeline = normalize_points(reference_series.points());

    let others: Vec<(Metric, Option<Vec<MetricPoint>>)> = series
        .iter()
        .filter(|(m, _)| **m != reference)
        .map(|(m, s)| (*m, s.as_ref().map(|s| normalize_points(s.points()))))
        .collect();

    timeline
        .iter()
        .map(|r| {
            let mut values = BTreeMap::new();
            values.insert(reference, Some(r.value));
            for (metric, points) in &others {
                let v = points
                    .as_deref()
                    .and_then(|pts| nearest_within(pts, r.ts_ms, tolerance_ms))
                    .map(|p| p.value);
                values.insert(*metric, v);
            }
            JoinedPoint {
                ts_ms: r.ts_ms,
                values,
            }
        })
        .collect()
}
