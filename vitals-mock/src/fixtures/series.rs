use chrono::{Datelike, NaiveDate, NaiveTime};
use vitals_core::{Metric, MetricPoint, MetricSeries};

const MINUTE_MS: i64 = 60_000;

// (samples, spacing, offset from 06:00 local-day start)
const fn layout(metric: Metric) -> (i64, i64, i64) {
    match metric {
        Metric::HeartRate => (120, 2 * MINUTE_MS, 0),
        Metric::Spo2 => (48, 5 * MINUTE_MS, MINUTE_MS + 37_000),
        Metric::Respiration => (80, 3 * MINUTE_MS, 41_000),
    }
}

fn value(metric: Metric, i: i64, day: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    match metric {
        Metric::HeartRate => (58 + (i * 7 + day) % 23) as f64,
        Metric::Spo2 => 94.0 + ((i * 3 + day) % 5) as f64 + 0.5,
        Metric::Respiration => 12.0 + ((i * 5 + day) % 60) as f64 / 10.0,
    }
}

/// Irregularly phased samples of `metric` for `date`, identical on every call.
pub fn by_metric(metric: Metric, date: NaiveDate) -> MetricSeries {
    let start = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() + 6 * 60 * MINUTE_MS;
    let day = i64::from(date.ordinal());
    let (count, spacing, offset) = layout(metric);
    (0..count)
        .map(|i| MetricPoint::new(start + offset + i * spacing, value(metric, i, day)))
        .collect()
}
