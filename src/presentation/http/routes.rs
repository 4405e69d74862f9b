//! Route Configuration
//!
//! Configures the client-facing and administrative routers.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, create_cors_layer, create_trace_layer, track_metrics,
};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the client-facing router
pub fn create_router(state: AppState) -> Router {
    let cors = create_cors_layer(&state.settings.cors_origins);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes(state.clone()))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(create_trace_layer())
        .layer(cors)
        .with_state(state)
}

/// Create the administrative router (loopback listener)
pub fn create_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/status", get(handlers::health::status))
        .route("/metrics", get(metrics_handler))
        .layer(create_trace_layer())
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/user", post(handlers::user::create_user))
        .route("/rp", post(handlers::room::create_room))
        .route("/rp/{slug}", get(handlers::room::get_room))
        .route("/rp/{slug}/msgs/{id}/history", get(handlers::document::message_history))
        .route("/rp/{slug}/chat", get(ws_handler))
        .route("/rp/{slug}/export", get(handlers::export::export_room))
        .route("/rp/{slug}/download.txt", get(handlers::export::download_txt))
        .merge(write_routes(state))
}

/// Document writes (require a user token)
fn write_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/rp/{slug}/msgs", post(handlers::document::create_message))
        .route("/rp/{slug}/msgs/{id}", put(handlers::document::edit_message))
        .route("/rp/{slug}/charas", post(handlers::document::create_character))
        .route("/rp/{slug}/charas/{id}", put(handlers::document::edit_character))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
