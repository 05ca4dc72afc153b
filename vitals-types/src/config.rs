//! Configuration types shared by the orchestrator, middleware and server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Metric;

/// What the cache serves when a refresh fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum StalePolicy {
    /// Serve freshly generated synthetic data and leave the cache untouched,
    /// so the next request retries the upstream.
    #[default]
    Synthetic,
    /// Serve the last real snapshot (tagged with the failure) when one exists;
    /// fall back to synthetic data otherwise.
    ServeStale,
}

/// Shape of generated fallback series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Number of samples per synthetic series.
    pub points: usize,
    /// Spacing between consecutive samples.
    pub interval: Duration,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            points: 50,
            interval: Duration::from_secs(60),
        }
    }
}

/// Global configuration for the vitals gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsConfig {
    /// Metrics fetched for every snapshot. The primary metric is always included.
    pub metrics: Vec<Metric>,
    /// Metric whose failure fails the whole fetch and whose timestamps drive the timeline.
    pub primary_metric: Metric,
    /// Timeout for each individual metric call.
    pub fetch_timeout: Duration,
    /// Timeout for a login attempt.
    pub login_timeout: Duration,
    /// Re-login-and-retry attempts after a session-expiry signal.
    pub session_retries: u32,
    /// Maximum distance between a reference timestamp and a joined sample.
    pub join_tolerance: Duration,
    /// Age below which a cached snapshot is served without touching the upstream.
    pub cache_ttl: Duration,
    /// Behavior when a refresh fails.
    pub stale_policy: StalePolicy,
    /// Shape of synthetic fallback data.
    pub fallback: FallbackConfig,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
            primary_metric: Metric::HeartRate,
            fetch_timeout: Duration::from_secs(10),
            login_timeout: Duration::from_secs(15),
            session_retries: 1,
            join_tolerance: Duration::from_secs(60),
            cache_ttl: Duration::from_secs(10 * 60),
            stale_policy: StalePolicy::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl VitalsConfig {
    /// Metrics to fetch, primary first, without duplicates.
    #[must_use]
    pub fn effective_metrics(&self) -> Vec<Metric> {
        let mut out = vec![self.primary_metric];
        for m in &self.metrics {
            if !out.contains(m) {
                out.push(*m);
            }
        }
        out
    }

    /// Join tolerance in whole milliseconds.
    #[must_use]
    pub fn join_tolerance_ms(&self) -> u64 {
        u64::try_from(self.join_tolerance.as_millis()).unwrap_or(u64::MAX)
    }
}
