use serde::ser::{Serialize, SerializeMap, Serializer};
use vitals::{Metric, MetricSeries, Snapshot};

/// Wire form of a snapshot as served by `GET /api`.
///
/// ```json
/// {
///   "hr": {"heartRateValues": [[ts, v], ...]},
///   "spo2": null,
///   "resp": {"respirationValues": [[ts, v], ...]},
///   "isMock": false,
///   "timeline": [{"ts": 0, "hr": 71.0, "spo2": null, "resp": 14.2}],
///   "generatedAt": 1709280000000
/// }
/// ```
///
/// Every known metric key is present; `debugError` only when a diagnostic exists.
pub struct SnapshotPayload<'a>(pub &'a Snapshot);

struct SeriesObject<'a>(Metric, &'a MetricSeries);

impl Serialize for SeriesObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0.values_key(), self.1)?;
        map.end()
    }
}

impl Serialize for SnapshotPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let snap = self.0;
        let mut map = serializer.serialize_map(None)?;
        for metric in Metric::ALL {
            let series = snap.series(metric).map(|s| SeriesObject(metric, s));
            map.serialize_entry(metric.key(), &series)?;
        }
        map.serialize_entry("isMock", &snap.is_synthetic())?;
        if let Some(diag) = snap.diagnostic() {
            map.serialize_entry("debugError", diag)?;
        }
        map.serialize_entry("timeline", snap.timeline())?;
        map.serialize_entry("generatedAt", &snap.generated_at().timestamp_millis())?;
        map.end()
    }
}
