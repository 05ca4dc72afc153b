//! Lifecycle of the one authenticated upstream session.
//!
//! Logins are expensive and risky (two-factor challenges, provider-side lockouts),
//! so the manager guarantees that at most one login is in flight at any time:
//! concurrent callers await the same shared future instead of starting their own.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use vitals_core::{Credentials, Session, VitalsError, WellnessConnector};

type LoginFuture = Shared<BoxFuture<'static, Result<Arc<Session>, VitalsError>>>;

enum SessionState {
    Uninitialized,
    Valid(Arc<Session>),
    Expired,
    LoggingIn { attempt: u64, login: LoginFuture },
}

/// Observable state of the managed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No login has succeeded yet, or the last attempt failed.
    Uninitialized,
    /// A session is established and believed valid.
    Valid,
    /// The last session was invalidated; the next use logs in again.
    Expired,
    /// A login is in flight.
    LoggingIn,
}

/// Owns the single upstream session for one credential pair.
pub struct SessionManager {
    connector: Arc<dyn WellnessConnector>,
    credentials: Arc<Credentials>,
    login_timeout: Duration,
    max_retries: u32,
    attempts: AtomicU64,
    state: Mutex<SessionState>,
}

impl SessionManager {
    /// Create a manager that logs in through `connector` with `credentials`.
    ///
    /// Defaults: 15 s login timeout, one re-login-and-retry after a session expiry.
    #[must_use]
    pub fn new(connector: Arc<dyn WellnessConnector>, credentials: Credentials) -> Self {
        Self {
            connector,
            credentials: Arc::new(credentials),
            login_timeout: Duration::from_secs(15),
            max_retries: 1,
            attempts: AtomicU64::new(0),
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    /// Bound each login attempt by `timeout`.
    #[must_use]
    pub const fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Number of re-login-and-retry rounds `with_session` performs after an expiry.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Number of login attempts started so far.
    pub fn login_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Current lifecycle state.
    pub async fn status(&self) -> SessionStatus {
        match &*self.state.lock().await {
            SessionState::Uninitialized => SessionStatus::Uninitialized,
            SessionState::Valid(_) => SessionStatus::Valid,
            SessionState::Expired => SessionStatus::Expired,
            SessionState::LoggingIn { .. } => SessionStatus::LoggingIn,
        }
    }

    /// Return the valid session, logging in first if there is none.
    ///
    /// Callers arriving while a login is in flight share its outcome.
    ///
    /// # Errors
    /// Returns `VitalsError::Authentication` when the login fails or times out; the
    /// manager is left uninitialized so the next call tries again.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "vitals::session::ensure_session", skip(self))
    )]
    pub async fn ensure_session(&self) -> Result<Arc<Session>, VitalsError> {
        let (attempt, login) = {
            let mut state = self.state.lock().await;
            match &*state {
                SessionState::Valid(session) => return Ok(Arc::clone(session)),
                SessionState::LoggingIn { attempt, login } => (*attempt, login.clone()),
                SessionState::Uninitialized | SessionState::Expired => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let login = self.login_future().shared();
                    *state = SessionState::LoggingIn {
                        attempt,
                        login: login.clone(),
                    };
                    (attempt, login)
                }
            }
        };

        let outcome = login.await;

        let mut state = self.state.lock().await;
        if matches!(&*state, SessionState::LoggingIn { attempt: current, .. } if *current == attempt)
        {
            *state = match &outcome {
                Ok(session) => SessionState::Valid(Arc::clone(session)),
                Err(_) => SessionState::Uninitialized,
            };
            #[cfg(feature = "tracing")]
            match &outcome {
                Ok(_) => tracing::info!(attempt, "upstream session established"),
                Err(e) => tracing::warn!(attempt, error = %e, "upstream login failed"),
            }
        }
        outcome
    }

    /// Mark the current session expired. Idempotent; a no-op without a session.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if matches!(&*state, SessionState::Valid(_)) {
            *state = SessionState::Expired;
        }
    }

    /// Run `op` with the current session, re-authenticating and retrying when it
    /// reports a session expiry.
    ///
    /// Only `VitalsError::SessionExpired` triggers a retry, bounded by the
    /// configured retry count (one by default). Other errors are returned as-is.
    ///
    /// # Errors
    /// - `Authentication` if a (re-)login fails.
    /// - `SessionExpired` if `op` still reports expiry after the last retry; the
    ///   session stays expired for the next caller.
    /// - Any other error returned by `op`.
    pub async fn with_session<T, F, Fut>(&self, op: F) -> Result<T, VitalsError>
    where
        F: Fn(Arc<Session>) -> Fut,
        Fut: Future<Output = Result<T, VitalsError>>,
    {
        let mut retries_left = self.max_retries;
        loop {
            let session = self.ensure_session().await?;
            match op(Arc::clone(&session)).await {
                Err(e) if e.is_session_expiry() => {
                    self.expire(&session).await;
                    if retries_left == 0 {
                        return Err(VitalsError::session_expired(self.connector.name()));
                    }
                    retries_left -= 1;
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        connector = self.connector.name(),
                        "upstream session expired; re-authenticating"
                    );
                }
                other => return other,
            }
        }
    }

    // Only expire `session` if it is still the current one: when several
    // operations hit the same expiry, the first re-login serves them all.
    async fn expire(&self, session: &Arc<Session>) {
        let mut state = self.state.lock().await;
        if let SessionState::Valid(current) = &*state
            && Arc::ptr_eq(current, session)
        {
            *state = SessionState::Expired;
        }
    }

    fn login_future(&self) -> BoxFuture<'static, Result<Arc<Session>, VitalsError>> {
        let connector = Arc::clone(&self.connector);
        let credentials = Arc::clone(&self.credentials);
        let timeout = self.login_timeout;
        async move {
            let name = connector.name();
            let provider = connector
                .as_session_provider()
                .ok_or_else(|| VitalsError::unsupported("login"))?;
            match tokio::time::timeout(timeout, provider.login(&credentials)).await {
                Ok(Ok(session)) => Ok(Arc::new(session)),
                Ok(Err(e)) => Err(as_authentication(name, e)),
                Err(_) => Err(VitalsError::authentication(
                    name,
                    format!("login timed out after {}ms", timeout.as_millis()),
                )),
            }
        }
        .boxed()
    }
}

fn as_authentication(connector: &str, err: VitalsError) -> VitalsError {
    match err {
        e @ (VitalsError::Authentication { .. } | VitalsError::Unsupported { .. }) => e,
        other => VitalsError::authentication(connector, other.to_string()),
    }
}
