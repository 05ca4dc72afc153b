//! vitals-http
//!
//! Connector that implements `WellnessConnector` against a REST wellness provider.
//!
//! Protocol:
//! - `POST {base}/auth/login` with `{"username", "password"}` answers `{"token"}`.
//!   A 401/403, or a body carrying `"mfaRequired": true`, is a rejected login.
//! - `GET {base}/wellness/{metric}/{YYYY-MM-DD}` with a bearer token answers
//!   `{"<valuesKey>": [[ts, value | null], ...]}`. A 401 means the session expired.
#![warn(missing_docs)]

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use url::Url;
use vitals_core::connector::{MetricProvider, SessionProvider, WellnessConnector};
use vitals_core::{Credentials, Metric, MetricSeries, Session, VitalsError};

use crate::wire::{LoginRequest, LoginResponse, MetricBody, metric_path};

/// REST connector for a wellness provider.
#[derive(Debug)]
pub struct HttpConnector {
    client: Client,
    base: Url,
}

impl HttpConnector {
    /// Connector name used in logs and error tags.
    pub const NAME: &'static str = "vitals-http";

    /// Connector for the provider rooted at `base_url`, with a default client.
    ///
    /// # Errors
    /// Returns `Configuration` if `base_url` is not an absolute http(s) URL or the
    /// HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, VitalsError> {
        let client = Client::builder()
            .user_agent(concat!("vitals/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| VitalsError::configuration(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, base_url)
    }

    /// Connector using a caller-supplied client.
    ///
    /// # Errors
    /// Returns `Configuration` if `base_url` is not an absolute http(s) URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, VitalsError> {
        let base = Url::parse(base_url)
            .map_err(|e| VitalsError::configuration(format!("invalid upstream URL {base_url}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(VitalsError::configuration(format!(
                "invalid upstream URL {base_url}: expected an http(s) URL"
            )));
        }
        Ok(Self { client, base })
    }

    /// Root URL of the provider.
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, VitalsError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| VitalsError::configuration("upstream URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn transport(e: &reqwest::Error) -> VitalsError {
        VitalsError::connector(Self::NAME, e.to_string())
    }
}

impl WellnessConnector for HttpConnector {
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
impl SessionProvider for HttpConnector {
    async fn login(&self, credentials: &Credentials) -> Result<Session, VitalsError> {
        let url = self.endpoint(&["auth", "login"])?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest {
                username: credentials.identifier(),
                password: credentials.secret(),
            })
            .send()
            .await
            .map_err(|e| Self::transport(&e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(VitalsError::authentication(Self::NAME, "invalid credentials"));
            }
            s if !s.is_success() => {
                return Err(VitalsError::authentication(
                    Self::NAME,
                    format!("login failed with status {s}"),
                ));
            }
            _ => {}
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            VitalsError::authentication(Self::NAME, format!("unreadable login response: {e}"))
        })?;
        if body.mfa_required {
            return Err(VitalsError::authentication(
                Self::NAME,
                "two-factor challenge required",
            ));
        }
        match body.token {
            Some(token) if !token.is_empty() => Ok(Session::new(token)),
            _ => Err(VitalsError::authentication(
                Self::NAME,
                "login response carried no token",
            )),
        }
    }
}

#[async_trait]
impl MetricProvider for HttpConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "vitals_http::metric", skip(self, session), fields(metric = metric.key(), date = %date))
    )]
    async fn metric(
        &self,
        session: &Session,
        metric: Metric,
        date: NaiveDate,
    ) -> Result<MetricSeries, VitalsError> {
        let day = date.format("%Y-%m-%d").to_string();
        let url = self.endpoint(&["wellness", metric_path(metric), &day])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(|e| Self::transport(&e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(VitalsError::session_expired(Self::NAME));
            }
            s if !s.is_success() => {
                return Err(VitalsError::connector(Self::NAME, format!("HTTP {s}")));
            }
            _ => {}
        }

        let body: MetricBody = response
            .json()
            .await
            .map_err(|e| VitalsError::Data(format!("malformed {metric} payload: {e}")))?;
        let series = body.into_series(metric);
        #[cfg(feature = "tracing")]
        tracing::debug!(samples = series.len(), "metric fetched");
        Ok(series)
    }

    fn supported_metrics(&self) -> &'static [Metric] {
        &Metric::ALL
    }
}
