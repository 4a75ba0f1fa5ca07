//! Service HTTP Routes
//!
//! Public reads, authenticated writes. Service status written through the PUT
//! endpoint is the manual administrative override; cascade-driven status
//! changes never pass through here.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{NewService, Service, ServicePatch};

use super::{core_error_response, require_admin, ApiState, ErrorResponse, MessageResponse};

/// Create service routes
pub fn service_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_services_handler))
        .route("/", post(create_service_handler))
        .route("/:id", get(get_service_handler))
        .route("/:id", put(update_service_handler))
        .route("/:id", delete(delete_service_handler))
        .with_state(state)
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct ServicesListResponse {
    pub services: Vec<Service>,
    pub total: usize,
}

// ==================
// Handlers
// ==================

async fn list_services_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ServicesListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let services = state
        .registry
        .list()
        .map_err(|e| core_error_response(&e))?;

    Ok(Json(ServicesListResponse {
        total: services.len(),
        services,
    }))
}

async fn get_service_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, (StatusCode, Json<ErrorResponse>)> {
    let service = state.registry.get(id).map_err(|e| core_error_response(&e))?;
    Ok(Json(service))
}

async fn create_service_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<NewService>,
) -> Result<(StatusCode, Json<Service>), (StatusCode, Json<ErrorResponse>)> {
    require_admin(&headers, &state)?;

    let service = state
        .registry
        .create(request)
        .map_err(|e| core_error_response(&e))?;

    state.metrics.increment_services_created();
    Ok((StatusCode::CREATED, Json(service)))
}

async fn update_service_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<ServicePatch>,
) -> Result<Json<Service>, (StatusCode, Json<ErrorResponse>)> {
    require_admin(&headers, &state)?;

    let service = state
        .registry
        .update(id, patch)
        .map_err(|e| core_error_response(&e))?;

    Ok(Json(service))
}

async fn delete_service_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_admin(&headers, &state)?;

    state
        .registry
        .delete(id)
        .map_err(|e| core_error_response(&e))?;

    state.metrics.increment_services_deleted();
    Ok(Json(MessageResponse {
        message: "Service removed".to_string(),
    }))
}
