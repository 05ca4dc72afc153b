use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use vitals_core::{
    Metric, MetricSeries, Snapshot, SnapshotSource, VitalsError, join_series,
};

use crate::Vitals;
use crate::core::tag_err;

impl Vitals {
    /// Fetch every configured metric for `date` concurrently and assemble a snapshot.
    ///
    /// Behavior:
    /// - Each metric call runs through the session manager (re-login and one retry
    ///   on session expiry) and is bounded by the fetch timeout.
    /// - All calls are awaited before anything is assembled; no partial snapshot is
    ///   ever observable.
    /// - A failing secondary metric is recorded as `None`; the snapshot is still live.
    /// - The series are joined onto the primary metric's timestamps.
    ///
    /// # Errors
    /// Returns the (metric-tagged) error of the primary metric if it fails. This
    /// method never substitutes synthetic data.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "vitals::fetch_snapshot",
            skip(self),
            fields(connector = self.connector.name(), date = %date),
        )
    )]
    pub async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, VitalsError> {
        let primary = self.cfg.primary_metric;
        let metrics = self.cfg.effective_metrics();

        let tasks = metrics
            .iter()
            .map(|&metric| async move { (metric, self.fetch_metric(metric, date).await) });
        let results = join_all(tasks).await;

        let mut series = BTreeMap::new();
        for (metric, result) in results {
            match result {
                Ok(s) => {
                    series.insert(metric, Some(s));
                }
                Err(e) if metric == primary => return Err(e),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    if e.is_actionable() {
                        tracing::warn!(metric = metric.key(), error = %e, "metric unavailable; degrading to null");
                    }
                    #[cfg(not(feature = "tracing"))]
                    let _ = e;
                    series.insert(metric, None);
                }
            }
        }

        let timeline = join_series(primary, &series, self.cfg.join_tolerance_ms());
        Ok(Snapshot::live(series, timeline))
    }

    async fn fetch_metric(&self, metric: Metric, date: NaiveDate) -> Result<MetricSeries, VitalsError> {
        let name = self.connector.name();
        let Some(provider) = self
            .connector
            .as_metric_provider()
            .filter(|_| self.connector.supports_metric(metric))
        else {
            return Err(tag_err(
                metric,
                VitalsError::unsupported(format!("metric:{metric}")),
            ));
        };
        let timeout = self.cfg.fetch_timeout;

        self.sessions
            .with_session(|session| async move {
                Self::upstream_call_with_timeout(
                    name,
                    metric.key(),
                    timeout,
                    provider.metric(&session, metric, date),
                )
                .await
            })
            .await
            .map_err(|e| tag_err(metric, e))
    }
}

#[async_trait]
impl SnapshotSource for Vitals {
    fn name(&self) -> &'static str {
        self.connector.name()
    }

    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, VitalsError> {
        Self::fetch_snapshot(self, date).await
    }
}
