//! vitals gateway entry point.
//!
//! Reads configuration from the environment, builds the gateway and serves it
//! with axum until interrupted.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vitals_server::{ServerConfig, ServerError, router};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let gateway = Arc::new(config.gateway()?);
    if let Some(err) = gateway.configuration_error() {
        tracing::warn!(error = %err, "upstream not configured; every response will be synthetic");
    }

    let addr = config.bind;
    tracing::info!(%addr, configured = gateway.is_configured(), "starting vitals gateway");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let server = axum::serve(listener, router(gateway));
    tokio::select! {
        result = server => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }
    Ok(())
}
