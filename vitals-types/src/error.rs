use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the vitals workspace.
///
/// Covers configuration gaps, upstream authentication and session failures,
/// per-metric fetch failures and timeouts, and connector-tagged transport errors.
/// Every variant is recoverable at the gateway boundary: none of them should
/// reach an HTTP caller as a failure status.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VitalsError {
    /// Required process configuration (credentials, upstream location) is absent or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description of the missing or invalid setting.
        message: String,
    },

    /// Login was rejected, challenged (two-factor) or could not reach the provider.
    #[error("authentication failed via {connector}: {msg}")]
    Authentication {
        /// Connector name that attempted the login.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The provider reported that the session is no longer logged in.
    #[error("session expired via {connector}")]
    SessionExpired {
        /// Connector name that reported the expiry.
        connector: String,
    },

    /// A single metric could not be fetched.
    #[error("{metric} fetch failed: {msg}")]
    MetricFetch {
        /// Wire key of the metric (e.g. "hr").
        metric: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An individual upstream call exceeded the configured timeout.
    #[error("upstream timed out: {capability} via {connector}")]
    UpstreamTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label (e.g. "login", "metric:hr").
        capability: String,
    },

    /// An individual connector returned a transport or protocol error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Issues with the returned or expected data (missing fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "metric:spo2").
        capability: String,
    },
}

impl VitalsError {
    /// Helper: build a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Helper: build the `Configuration` error reported when credential variables are absent.
    #[must_use]
    pub fn missing_credentials(vars: &[&str]) -> Self {
        Self::configuration(format!("missing credentials ({})", vars.join(", ")))
    }

    /// Helper: build an `Authentication` error with the connector name and message.
    pub fn authentication(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Authentication {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SessionExpired` error.
    pub fn session_expired(connector: impl Into<String>) -> Self {
        Self::SessionExpired {
            connector: connector.into(),
        }
    }

    /// Helper: build a `MetricFetch` error.
    pub fn metric_fetch(metric: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::MetricFetch {
            metric: metric.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `UpstreamTimeout` error.
    pub fn upstream_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::UpstreamTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Returns true if this error is the provider's "not logged in" signal.
    ///
    /// Only this class of failure triggers a re-login and retry.
    #[must_use]
    pub const fn is_session_expiry(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Returns true if retrying later with the same configuration cannot succeed.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true if this error should be surfaced to operators as actionable.
    ///
    /// A metric the connector does not offer is expected, not actionable.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}
