//! Vitals-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod credentials;
mod error;
mod metric;
mod series;
mod snapshot;

pub use config::{FallbackConfig, StalePolicy, VitalsConfig};
pub use credentials::{ACCOUNT_ID_ENV, ACCOUNT_SECRET_ENV, Credentials};
pub use error::VitalsError;
pub use metric::Metric;
pub use series::{MetricPoint, MetricSeries};
pub use snapshot::{JoinedPoint, Snapshot};
