//! vitals-mock
//!
//! Connectors for tests and offline runs:
//!
//! - [`MockConnector`] serves deterministic fixture series and never touches the network.
//! - [`DynamicMockConnector`] defers every call to a [`DynamicMockController`], so tests
//!   can script failures, hangs, slow logins and session revocation.

use async_trait::async_trait;
use chrono::NaiveDate;
use vitals_core::connector::{MetricProvider, SessionProvider, WellnessConnector};
use vitals_core::{Credentials, Metric, MetricSeries, Session, VitalsError};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Mock connector for CI-safe runs. Provides deterministic data from static fixtures.
///
/// Logging in with the identifier `FAIL` is rejected; `2FA` triggers a two-factor
/// challenge, which is also reported as an authentication failure.
pub struct MockConnector;

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Connector name used in logs and error tags.
    pub const NAME: &'static str = "vitals-mock";

    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl WellnessConnector for MockConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn as_session_provider(&self) -> Option<&dyn SessionProvider> {
        Some(self as &dyn SessionProvider)
    }

    fn as_metric_provider(&self) -> Option<&dyn MetricProvider> {
        Some(self as &dyn MetricProvider)
    }
}

#[async_trait]
impl SessionProvider for MockConnector {
    async fn login(&self, credentials: &Credentials) -> Result<Session, VitalsError> {
        match credentials.identifier() {
            "FAIL" => Err(VitalsError::authentication(Self::NAME, "invalid credentials")),
            "2FA" => Err(VitalsError::authentication(
                Self::NAME,
                "two-factor challenge required",
            )),
            id => Ok(Session::new(format!("mock-token-{id}"))),
        }
    }
}

#[async_trait]
impl MetricProvider for MockConnector {
    async fn metric(
        &self,
        session: &Session,
        metric: Metric,
        date: NaiveDate,
    ) -> Result<MetricSeries, VitalsError> {
        if !session.token().starts_with("mock-token-") {
            return Err(VitalsError::session_expired(Self::NAME));
        }
        Ok(fixtures::series::by_metric(metric, date))
    }

    fn supported_metrics(&self) -> &'static [Metric] {
        &Metric::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn fixtures_are_deterministic_and_sorted() {
        let mock = MockConnector::new();
        let session = mock
            .login(&Credentials::new("someone", "pw"))
            .await
            .unwrap();
        for metric in Metric::ALL {
            let a = mock.metric(&session, metric, date()).await.unwrap();
            let b = mock.metric(&session, metric, date()).await.unwrap();
            assert_eq!(a, b);
            assert!(!a.is_empty());
            assert!(a.is_strictly_increasing());
        }
    }

    #[tokio::test]
    async fn scripted_login_failures() {
        let mock = MockConnector::new();
        for id in ["FAIL", "2FA"] {
            let err = mock.login(&Credentials::new(id, "pw")).await.unwrap_err();
            assert!(matches!(err, VitalsError::Authentication { .. }));
        }
    }

    #[tokio::test]
    async fn foreign_token_is_expired() {
        let mock = MockConnector::new();
        let err = mock
            .metric(&Session::new("other"), Metric::HeartRate, date())
            .await
            .unwrap_err();
        assert!(err.is_session_expiry());
    }
}
