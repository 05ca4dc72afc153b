use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use vitals_core::connector::{MetricProvider, SessionProvider, WellnessConnector};
use vitals_core::{Credentials, Metric, MetricSeries, Session, VitalsError};

/// Instruction for how a method should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(VitalsError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    login_rule: Option<MockBehavior<()>>,
    login_delay: Option<Duration>,
    metric_rules: HashMap<Metric, MockBehavior<MetricSeries>>,
    // token -> generation; tokens below `valid_from` are revoked
    issued: HashMap<String, u64>,
    next_generation: u64,
    valid_from: u64,
    always_expire: bool,
    login_calls: usize,
    metric_calls: HashMap<Metric, usize>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior of `login`. Without a rule every login succeeds.
    pub async fn set_login_behavior(&self, behavior: MockBehavior<()>) {
        self.state.lock().await.login_rule = Some(behavior);
    }

    /// Delay every login by `delay` before applying its behavior.
    pub async fn set_login_delay(&self, delay: Duration) {
        self.state.lock().await.login_delay = Some(delay);
    }

    /// Set the behavior of `metric` calls for one metric.
    pub async fn set_metric_behavior(&self, metric: Metric, behavior: MockBehavior<MetricSeries>) {
        self.state.lock().await.metric_rules.insert(metric, behavior);
    }

    /// Invalidate every session issued so far; their next metric call reports expiry.
    pub async fn revoke_sessions(&self) {
        let mut guard = self.state.lock().await;
        guard.valid_from = guard.next_generation;
    }

    /// When set, every metric call reports session expiry, even right after a login.
    pub async fn set_always_expire(&self, on: bool) {
        self.state.lock().await.always_expire = on;
    }

    /// Number of `login` calls received.
    pub async fn login_calls(&self) -> usize {
        self.state.lock().await.login_calls
    }

    /// Number of `metric` calls received for `metric`.
    pub async fn metric_calls(&self, metric: Metric) -> usize {
        self.state
            .lock()
            .await
            .metric_calls
            .get(&metric)
            .copied()
            .unwrap_or(0)
    }

    /// Number of `metric` calls received across all metrics.
    pub async fn total_metric_calls(&self) -> usize {
        self.state.lock().await.metric_calls.values().sum()
    }

    /// Total upstream traffic: logins plus metric calls.
    pub async fn upstream_calls(&self) -> usize {
        let guard = self.state.lock().await;
        guard.login_calls + guard.metric_calls.values().sum::<usize>()
    }

    /// Clear all configured behaviors, sessions and counters.
    pub async fn clear_all_behaviors(&self) {
        *self.state.lock().await = InternalState::default();
    }
}

/// A connector that defers all behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn WellnessConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn WellnessConnector>, controller)
    }
}

impl WellnessConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn as_session_provider(&self) -> Option<&dyn SessionProvider> {
        Some(self as &dyn SessionProvider)
    }

    fn as_metric_provider(&self) -> Option<&dyn MetricProvider> {
        Some(self as &dyn MetricProvider)
    }
}

#[async_trait]
impl SessionProvider for DynamicMockConnector {
    async fn login(&self, _credentials: &Credentials) -> Result<Session, VitalsError> {
        // Read behavior without holding the lock across await points
        let (behavior, delay) = {
            let mut guard = self.state.lock().await;
            guard.login_calls += 1;
            (guard.login_rule.clone(), guard.login_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match behavior {
            None | Some(MockBehavior::Return(())) => {
                let mut guard = self.state.lock().await;
                let generation = guard.next_generation;
                guard.next_generation += 1;
                let token = format!("{}-session-{generation}", self.name);
                guard.issued.insert(token.clone(), generation);
                Ok(Session::new(token))
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

#[async_trait]
impl MetricProvider for DynamicMockConnector {
    async fn metric(
        &self,
        session: &Session,
        metric: Metric,
        _date: NaiveDate,
    ) -> Result<MetricSeries, VitalsError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.metric_calls.entry(metric).or_default() += 1;
            let live = guard
                .issued
                .get(session.token())
                .is_some_and(|generation| *generation >= guard.valid_from);
            if guard.always_expire || !live {
                return Err(VitalsError::session_expired(self.name));
            }
            guard.metric_rules.get(&metric).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(series)) => Ok(series),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(VitalsError::unsupported(format!("metric:{metric}"))),
        }
    }

    fn supported_metrics(&self) -> &'static [Metric] {
        &Metric::ALL
    }
}
