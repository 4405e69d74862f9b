//! Health and Status Handlers
//!
//! # Endpoints
//! - `GET /health` - Liveness plus a store ping (both listeners)
//! - `GET /status` - Lifecycle state and counters (admin listener only)

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::startup::{AppState, LifecycleState};

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Administrative status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: LifecycleState,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub rooms: i64,
    pub chat_streams: usize,
    pub secret_provisioned: bool,
    pub store_latency_ms: u64,
}

/// Health check: 200 when the store answers, 503 otherwise
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse { status: "healthy", version: env!("CARGO_PKG_VERSION"), message: None }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                version: env!("CARGO_PKG_VERSION"),
                message: Some(format!("Store unavailable: {}", e)),
            }),
        ),
    }
}

/// Server status for operators
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, crate::shared::error::AppError> {
    let start = Instant::now();
    let rooms = state.rooms.count().await?;
    let store_latency_ms = start.elapsed().as_millis() as u64;

    Ok(Json(StatusResponse {
        state: *state.lifecycle.borrow(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        rooms,
        chat_streams: state.hub.stream_count(),
        secret_provisioned: state.provisioner.is_provisioned(),
        store_latency_ms,
    }))
}
