use serde::{Deserialize, Serialize};
use vitals_core::{Metric, MetricPoint, MetricSeries};

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub mfa_required: bool,
}

type RawSamples = Option<Vec<(i64, Option<f64>)>>;

/// Body of a per-day metric response: `{"<valuesKey>": [[ts, value | null], ...]}`.
///
/// Other fields the provider sends along (dates, summaries) are ignored.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetricBody {
    #[serde(default)]
    heart_rate_values: RawSamples,
    #[serde(default)]
    spo2_values: RawSamples,
    #[serde(default)]
    respiration_values: RawSamples,
}

impl MetricBody {
    /// Samples of `metric`, without gaps. An absent or null array is an empty day.
    pub fn into_series(self, metric: Metric) -> MetricSeries {
        let raw = match metric {
            Metric::HeartRate => self.heart_rate_values,
            Metric::Spo2 => self.spo2_values,
            Metric::Respiration => self.respiration_values,
        };
        raw.unwrap_or_default()
            .into_iter()
            .filter_map(|(ts, value)| value.map(|v| MetricPoint::new(ts, v)))
            .collect()
    }
}

/// Path segment under `/wellness/` for `metric`.
pub(crate) const fn metric_path(metric: Metric) -> &'static str {
    match metric {
        Metric::HeartRate => "heart-rate",
        Metric::Spo2 => "spo2",
        Metric::Respiration => "respiration",
    }
}
