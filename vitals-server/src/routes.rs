use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use vitals::Gateway;

use crate::payload::SnapshotPayload;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    configured: bool,
}

/// Routes of the gateway: `GET /api` and `GET /` serve the snapshot, `GET /health` liveness.
///
/// Query parameters are accepted and ignored; they never bypass the cache.
pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/", get(snapshot))
        .route("/api", get(snapshot))
        .route("/health", get(health))
        .with_state(gateway)
}

async fn snapshot(State(gateway): State<Arc<Gateway>>) -> Response {
    let snap = gateway.snapshot().await;
    if snap.is_synthetic() {
        tracing::warn!(reason = snap.diagnostic().unwrap_or_default(), "serving synthetic snapshot");
    } else {
        tracing::debug!(timeline = snap.timeline().len(), "serving live snapshot");
    }
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(SnapshotPayload(&snap)),
    )
        .into_response()
}

async fn health(State(gateway): State<Arc<Gateway>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        configured: gateway.is_configured(),
    })
}
