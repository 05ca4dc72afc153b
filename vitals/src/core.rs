use std::sync::Arc;
use std::time::Duration;

use vitals_core::{
    Credentials, FallbackConfig, FallbackGenerator, Metric, StalePolicy, VitalsConfig, VitalsError,
    WellnessConnector,
};
use vitals_middleware::{SessionManager, SessionStatus, SnapshotCache};

use crate::gateway::Gateway;

/// Orchestrator that fetches every configured metric from one upstream connector.
pub struct Vitals {
    pub(crate) connector: Arc<dyn WellnessConnector>,
    pub(crate) sessions: Arc<SessionManager>,
    pub(crate) cfg: VitalsConfig,
}

/// Builder for constructing a `Vitals` orchestrator with custom configuration.
pub struct VitalsBuilder {
    connector: Option<Arc<dyn WellnessConnector>>,
    credentials: Option<Result<Credentials, VitalsError>>,
    cfg: VitalsConfig,
}

impl Default for VitalsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalsBuilder {
    /// Create a new builder with default configuration.
    ///
    /// Defaults: all metrics with heart rate as primary, 10 s per-metric timeout,
    /// 15 s login timeout, one re-login on session expiry, 60 s join tolerance,
    /// 10 min cache TTL, synthetic fallback on failure.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connector: None,
            credentials: None,
            cfg: VitalsConfig::default(),
        }
    }

    /// Register the upstream connector. A later call replaces an earlier one.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn WellnessConnector>) -> Self {
        self.connector = Some(c);
        self
    }

    /// Use explicit credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(Ok(credentials));
        self
    }

    /// Read credentials from the process environment.
    ///
    /// A missing variable is not an error here; it surfaces from [`build`](Self::build).
    #[must_use]
    pub fn credentials_from_env(mut self) -> Self {
        self.credentials = Some(Credentials::from_env());
        self
    }

    /// Read credentials through `lookup`, with the same rules as the environment.
    #[must_use]
    pub fn credentials_from_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.credentials = Some(Credentials::from_lookup(lookup));
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: VitalsConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Metrics to fetch for every snapshot. The primary metric is always added.
    #[must_use]
    pub fn metrics(mut self, metrics: &[Metric]) -> Self {
        self.cfg.metrics = metrics.to_vec();
        self
    }

    /// Metric whose failure fails the whole fetch and whose timestamps drive the timeline.
    #[must_use]
    pub const fn primary_metric(mut self, metric: Metric) -> Self {
        self.cfg.primary_metric = metric;
        self
    }

    /// Set the per-metric call timeout.
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.fetch_timeout = timeout;
        self
    }

    /// Set the login timeout.
    #[must_use]
    pub const fn login_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.login_timeout = timeout;
        self
    }

    /// Re-login-and-retry rounds after a session expiry.
    #[must_use]
    pub const fn session_retries(mut self, retries: u32) -> Self {
        self.cfg.session_retries = retries;
        self
    }

    /// Maximum distance between a timeline timestamp and an aligned sample.
    #[must_use]
    pub const fn join_tolerance(mut self, tolerance: Duration) -> Self {
        self.cfg.join_tolerance = tolerance;
        self
    }

    /// Age below which a cached snapshot is served as-is. Zero disables caching.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cfg.cache_ttl = ttl;
        self
    }

    /// What the gateway serves when a refresh fails.
    #[must_use]
    pub const fn stale_policy(mut self, policy: StalePolicy) -> Self {
        self.cfg.stale_policy = policy;
        self
    }

    /// Shape of synthetic fallback series.
    #[must_use]
    pub const fn fallback(mut self, fallback: FallbackConfig) -> Self {
        self.cfg.fallback = fallback;
        self
    }

    /// Build the `Vitals` orchestrator.
    ///
    /// # Errors
    /// - `Configuration` if no connector is registered or credentials are missing.
    /// - `InvalidArg` if the metric list is empty, a timeout is zero or the
    ///   fallback shape has no points.
    pub fn build(self) -> Result<Vitals, VitalsError> {
        let credentials = self.credentials.unwrap_or_else(Credentials::from_env);
        let (connector, credentials) = match (self.connector, credentials) {
            (Some(connector), Ok(credentials)) => (connector, credentials),
            (Some(_), Err(e)) => return Err(e),
            (None, Ok(_)) => {
                return Err(VitalsError::configuration("no upstream connector configured"));
            }
            (None, Err(VitalsError::Configuration { message })) => {
                return Err(VitalsError::configuration(format!(
                    "{message}; no upstream connector configured"
                )));
            }
            (None, Err(e)) => return Err(e),
        };
        validate(&self.cfg)?;

        let sessions = SessionManager::new(Arc::clone(&connector), credentials)
            .with_login_timeout(self.cfg.login_timeout)
            .with_max_retries(self.cfg.session_retries);

        Ok(Vitals {
            connector,
            sessions: Arc::new(sessions),
            cfg: self.cfg,
        })
    }

    /// Build a [`Gateway`]: live when the configuration is complete, otherwise an
    /// unconfigured gateway that serves synthetic snapshots tagged with the reason.
    #[must_use]
    pub fn build_gateway(self) -> Gateway {
        let fallback = fallback_for(&self.cfg);
        match self.build() {
            Ok(vitals) => Gateway::live(vitals),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "gateway is not configured; serving synthetic data");
                Gateway::unconfigured(e, fallback)
            }
        }
    }
}

fn validate(cfg: &VitalsConfig) -> Result<(), VitalsError> {
    if cfg.metrics.is_empty() {
        return Err(VitalsError::InvalidArg(
            "metric list is empty; configure at least one metric".to_string(),
        ));
    }
    if cfg.fetch_timeout.is_zero() || cfg.login_timeout.is_zero() {
        return Err(VitalsError::InvalidArg("timeouts must be non-zero".to_string()));
    }
    if cfg.fallback.points == 0 {
        return Err(VitalsError::InvalidArg(
            "fallback series need at least one point".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn fallback_for(cfg: &VitalsConfig) -> FallbackGenerator {
    FallbackGenerator::new(cfg.fallback, &cfg.metrics, cfg.primary_metric)
}

/// Attach the metric to an upstream failure.
///
/// Errors that already carry their own classification (authentication, session
/// expiry, timeouts, configuration) pass through unchanged.
pub fn tag_err(metric: Metric, e: VitalsError) -> VitalsError {
    match e {
        e @ (VitalsError::Authentication { .. }
        | VitalsError::SessionExpired { .. }
        | VitalsError::UpstreamTimeout { .. }
        | VitalsError::Configuration { .. }
        | VitalsError::MetricFetch { .. }) => e,
        other => VitalsError::metric_fetch(metric.key(), other.to_string()),
    }
}

impl Vitals {
    /// Start building a new `Vitals` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let vitals = vitals::Vitals::builder()
    ///     .with_connector(Arc::new(vitals_mock::MockConnector::new()))
    ///     .credentials_from_env()
    ///     .fetch_timeout(Duration::from_secs(5))
    ///     .build()?;
    /// let snapshot = vitals.fetch_snapshot(chrono::Local::now().date_naive()).await?;
    /// ```
    #[must_use]
    pub fn builder() -> VitalsBuilder {
        VitalsBuilder::new()
    }

    /// Effective configuration.
    pub const fn config(&self) -> &VitalsConfig {
        &self.cfg
    }

    /// The upstream connector.
    pub fn connector(&self) -> &Arc<dyn WellnessConnector> {
        &self.connector
    }

    /// Current state of the upstream session.
    pub async fn session_status(&self) -> SessionStatus {
        self.sessions.status().await
    }

    /// Number of login attempts made so far.
    pub fn login_attempts(&self) -> u64 {
        self.sessions.login_attempts()
    }

    /// Fallback generator shaped by this configuration.
    #[must_use]
    pub fn fallback_generator(&self) -> FallbackGenerator {
        fallback_for(&self.cfg)
    }

    /// Wrap this orchestrator in a cache configured from its own settings.
    #[must_use]
    pub fn into_cache(self: Arc<Self>) -> SnapshotCache {
        let fallback = self.fallback_generator();
        let ttl = self.cfg.cache_ttl;
        let policy = self.cfg.stale_policy;
        SnapshotCache::new(self, fallback, ttl).with_stale_policy(policy)
    }

    /// Wrap an upstream future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "vitals::core::upstream_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn upstream_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, VitalsError>
    where
        Fut: core::future::Future<Output = Result<T, VitalsError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(VitalsError::upstream_timeout(connector_name, capability)))
    }
}
