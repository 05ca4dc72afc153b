//! Process configuration read from the environment.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use vitals::{Gateway, StalePolicy, Vitals, VitalsBuilder};
use vitals_http::HttpConnector;
use vitals_mock::MockConnector;

/// Upstream base URL of the REST provider.
pub const UPSTREAM_URL_ENV: &str = "VITALS_UPSTREAM_URL";
/// Set to a truthy value to serve fixture data instead of a real upstream.
pub const USE_MOCK_ENV: &str = "VITALS_USE_MOCK";
/// Listen host.
pub const BIND_ENV: &str = "VITALS_BIND";
/// Listen port.
pub const PORT_ENV: &str = "PORT";
/// Cache TTL in seconds.
pub const CACHE_TTL_ENV: &str = "VITALS_CACHE_TTL_SECS";
/// Per-metric fetch timeout in milliseconds.
pub const FETCH_TIMEOUT_ENV: &str = "VITALS_FETCH_TIMEOUT_MS";
/// Login timeout in milliseconds.
pub const LOGIN_TIMEOUT_ENV: &str = "VITALS_LOGIN_TIMEOUT_MS";
/// `synthetic` or `stale`.
pub const STALE_POLICY_ENV: &str = "VITALS_STALE_POLICY";

/// Startup and serving failures of the binary.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration value is present but malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address we tried to bind.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Where snapshots come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upstream {
    /// REST provider rooted at this URL.
    Rest(String),
    /// Built-in fixture connector.
    Mock,
    /// Nothing configured; the gateway serves synthetic data.
    Missing,
}

/// Everything the binary reads from its environment, except the secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Upstream selection.
    pub upstream: Upstream,
    /// Cache TTL override.
    pub cache_ttl: Option<Duration>,
    /// Fetch timeout override.
    pub fetch_timeout: Option<Duration>,
    /// Login timeout override.
    pub login_timeout: Option<Duration>,
    /// Failure policy override.
    pub stale_policy: Option<StalePolicy>,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for malformed values. Absent values use defaults.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for malformed values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = read(BIND_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse(PORT_ENV, read(PORT_ENV))?.unwrap_or(3000);
        let ip = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map_err(|e| ServerError::InvalidConfig(format!("invalid bind host {host}: {e}")))?;
        let bind = SocketAddr::new(ip, port);

        let use_mock = read(USE_MOCK_ENV).is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));
        let upstream = match read(UPSTREAM_URL_ENV) {
            _ if use_mock => Upstream::Mock,
            Some(url) => Upstream::Rest(url),
            None => Upstream::Missing,
        };

        let stale_policy = match read(STALE_POLICY_ENV).as_deref() {
            None => None,
            Some("synthetic") => Some(StalePolicy::Synthetic),
            Some("stale") => Some(StalePolicy::ServeStale),
            Some(other) => {
                return Err(ServerError::InvalidConfig(format!(
                    "{STALE_POLICY_ENV} must be `synthetic` or `stale`, got `{other}`"
                )));
            }
        };

        Ok(Self {
            bind,
            upstream,
            cache_ttl: parse::<u64>(CACHE_TTL_ENV, read(CACHE_TTL_ENV))?.map(Duration::from_secs),
            fetch_timeout: parse::<u64>(FETCH_TIMEOUT_ENV, read(FETCH_TIMEOUT_ENV))?
                .map(Duration::from_millis),
            login_timeout: parse::<u64>(LOGIN_TIMEOUT_ENV, read(LOGIN_TIMEOUT_ENV))?
                .map(Duration::from_millis),
            stale_policy,
        })
    }

    /// Apply the overrides and upstream selection to a builder.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the upstream URL is malformed.
    pub fn apply(&self, mut builder: VitalsBuilder) -> Result<VitalsBuilder, ServerError> {
        match &self.upstream {
            Upstream::Rest(url) => {
                let connector = HttpConnector::new(url)
                    .map_err(|e| ServerError::InvalidConfig(e.to_string()))?;
                builder = builder.with_connector(Arc::new(connector));
            }
            Upstream::Mock => builder = builder.with_connector(Arc::new(MockConnector::new())),
            Upstream::Missing => {}
        }
        if let Some(ttl) = self.cache_ttl {
            builder = builder.cache_ttl(ttl);
        }
        if let Some(t) = self.fetch_timeout {
            builder = builder.fetch_timeout(t);
        }
        if let Some(t) = self.login_timeout {
            builder = builder.login_timeout(t);
        }
        if let Some(p) = self.stale_policy {
            builder = builder.stale_policy(p);
        }
        Ok(builder)
    }

    /// Build the gateway, reading credentials from the process environment.
    ///
    /// Missing credentials or upstream yield an unconfigured gateway, not an error.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the upstream URL is malformed.
    pub fn gateway(&self) -> Result<Gateway, ServerError> {
        Ok(self
            .apply(Vitals::builder().credentials_from_env())?
            .build_gateway())
    }
}

fn parse<T>(key: &str, value: Option<String>) -> Result<Option<T>, ServerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| ServerError::InvalidConfig(format!("{key}={v}: {e}")))
        })
        .transpose()
}
