//! Vitals serves a day's wellness metrics from a fragile upstream provider.
//!
//! Overview
//! - [`Vitals`] fetches every configured metric concurrently through one shared,
//!   lazily established upstream session, and aligns the series on the primary
//!   metric's timestamps.
//! - A failing secondary metric degrades to `null`; a failing primary metric
//!   fails the fetch.
//! - [`Gateway`] puts a time-bounded cache in front of the orchestrator and
//!   turns every failure (including missing configuration) into a synthetic
//!   snapshot tagged with a diagnostic, so callers always get data.
//!
//! Building a gateway:
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vitals::{Metric, StalePolicy, Vitals};
//!
//! let gateway = Vitals::builder()
//!     .with_connector(Arc::new(vitals_mock::MockConnector::new()))
//!     .credentials_from_env()
//!     .metrics(&[Metric::HeartRate, Metric::Spo2])
//!     .cache_ttl(Duration::from_secs(300))
//!     .stale_policy(StalePolicy::ServeStale)
//!     .build_gateway();
//!
//! let snapshot = gateway.snapshot().await;
//! if snapshot.is_synthetic() {
//!     eprintln!("serving generated data: {:?}", snapshot.diagnostic());
//! }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod fetch;
mod gateway;

pub use crate::core::{Vitals, VitalsBuilder, tag_err};
pub use crate::gateway::Gateway;

pub use vitals_middleware::{SessionManager, SessionStatus, SnapshotCache};

// Re-export core types for convenience
pub use vitals_core::{
    Credentials, FallbackConfig, FallbackGenerator, JoinedPoint, Metric, MetricPoint,
    MetricSeries, Snapshot, SnapshotSource, StalePolicy, VitalsConfig, VitalsError,
    WellnessConnector, join_series,
};
