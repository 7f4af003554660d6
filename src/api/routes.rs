//! API route configuration

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::{sync::Arc, time::Instant};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{config::ServerConfig, observability::CodecMetrics};

use super::handlers::{self, AppState};

/// Build the complete API router with middleware
pub fn build_router(app_state: AppState, server: &ServerConfig) -> Router {
    let metrics = app_state.metrics.clone();

    // Public routes
    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(app_state.clone());

    // Codec routes (with body size limit and request metrics)
    let api_routes = Router::new()
        .route("/api/v1/encode", post(handlers::encode))
        .route("/api/v1/decode", post(handlers::decode))
        .route("/api/v1/compress", post(handlers::compress))
        .route("/api/v1/decompress", post(handlers::decompress))
        .route("/api/v1/exchange", post(handlers::exchange))
        .route("/api/v1/bundle", post(handlers::bundle))
        .layer(RequestBodyLimitLayer::new(server.max_body_size_kb * 1024))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(metrics, track_metrics)),
        )
        .with_state(app_state);

    public_routes.merge(api_routes)
}

/// Root handler
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "Efficode Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot();

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": snapshot.uptime_secs,
        "compression_threshold": state.codec.compressor().threshold(),
    }))
}

/// Metrics handler, plain text for Prometheus scraping
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.export_prometheus()
}

/// Request timing and error accounting
async fn track_metrics(
    State(metrics): State<Arc<CodecMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(req).await;

    metrics.record_request(start.elapsed());
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        metrics.record_error();
    }

    response
}
