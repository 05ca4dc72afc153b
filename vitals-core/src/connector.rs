use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{Credentials, Metric, MetricSeries, VitalsError};

/// Opaque handle to an authenticated upstream connection.
///
/// Produced by [`SessionProvider::login`] and owned by the session manager, which
/// hands out shared references to in-flight operations. Deliberately not `Clone`.
pub struct Session {
    token: String,
}

impl Session {
    /// Wrap a provider-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Provider-issued token (cookie, bearer token, ...).
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Focused role trait for connectors that can authenticate.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Log in with the deployment's credentials.
    ///
    /// Any failure (rejected credentials, two-factor challenge, network error)
    /// is reported as an error; callers treat them uniformly.
    async fn login(&self, credentials: &Credentials) -> Result<Session, VitalsError>;
}

/// Focused role trait for connectors that serve per-day metric series.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    /// Fetch all samples of `metric` recorded on `date`.
    ///
    /// Must return `VitalsError::SessionExpired` when the provider reports that the
    /// session is no longer logged in, so the caller can re-authenticate.
    async fn metric(
        &self,
        session: &Session,
        metric: Metric,
        date: NaiveDate,
    ) -> Result<MetricSeries, VitalsError>;

    /// REQUIRED: metrics this connector can serve.
    fn supported_metrics(&self) -> &'static [Metric];
}

/// Unified connector interface for a wellness-data provider.
pub trait WellnessConnector: Send + Sync {
    /// Stable connector name used in logs and error tags.
    fn name(&self) -> &'static str;

    /// Advertise login support by returning `Some(self)`.
    fn as_session_provider(&self) -> Option<&dyn SessionProvider> {
        None
    }

    /// Advertise metric support by returning `Some(self)`.
    fn as_metric_provider(&self) -> Option<&dyn MetricProvider> {
        None
    }

    /// Whether `metric` can be fetched through this connector.
    fn supports_metric(&self, metric: Metric) -> bool {
        self.as_metric_provider()
            .is_some_and(|p| p.supported_metrics().contains(&metric))
    }
}
