//! Status & Health Routes
//!
//! The public banner endpoint, the health check, and the metrics snapshot.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::core::ServiceStatus;
use crate::observability::{MetricsRegistry, MetricsSnapshot};

use super::{core_error_response, ApiState, ErrorResponse};

/// Health check at the root level
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Public aggregate status under /api/status
pub fn status_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/status", get(overall_status_handler))
        .with_state(state)
}

/// Metrics snapshot under /observability
pub fn observability_routes(metrics: Arc<MetricsRegistry>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// The single system-wide banner status
#[derive(Debug, Serialize)]
pub struct OverallStatusResponse {
    pub status: ServiceStatus,
}

// ==================
// Handlers
// ==================

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn overall_status_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<OverallStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let status = state
        .aggregate
        .compute()
        .map_err(|e| core_error_response(&e))?;

    Ok(Json(OverallStatusResponse { status }))
}

async fn metrics_handler(State(metrics): State<Arc<MetricsRegistry>>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
