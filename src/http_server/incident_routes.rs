//! Incident HTTP Routes
//!
//! Public reads resolve affected-service ids into `{id, name, status}`
//! summaries; writes accept raw ids. Listing defaults to incidents that are
//! not resolved unless the caller filters by an explicit status value.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{
    CoreError, Incident, IncidentFilter, IncidentPatch, IncidentStatus, IncidentUpdate,
    NewIncident, ServiceSummary, Severity,
};
use crate::store::ServiceStore;

use super::{core_error_response, require_admin, ApiState, ErrorResponse, MessageResponse};

/// Create incident routes
pub fn incident_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_incidents_handler))
        .route("/", post(create_incident_handler))
        .route("/:id", get(get_incident_handler))
        .route("/:id", put(update_incident_handler))
        .route("/:id", delete(delete_incident_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct IncidentListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Incident with affected services resolved into summaries
#[derive(Debug, Serialize)]
pub struct IncidentResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: IncidentStatus,
    pub severity: Severity,
    pub affected_services: Vec<ServiceSummary>,
    pub updates: Vec<IncidentUpdate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct IncidentsListResponse {
    pub incidents: Vec<IncidentResponse>,
    pub total: usize,
}

// ==================
// Helpers
// ==================

fn resolve_summaries(state: &ApiState, incident: Incident) -> IncidentResponse {
    // One batch fetch; a service deleted out from under a racing read is
    // simply absent from the summaries.
    let summaries = state
        .services
        .fetch_many(&incident.affected_services)
        .map(|services| services.iter().map(|s| s.summary()).collect())
        .unwrap_or_default();

    IncidentResponse {
        id: incident.id,
        title: incident.title,
        description: incident.description,
        status: incident.status,
        severity: incident.severity,
        affected_services: summaries,
        updates: incident.updates,
        created_at: incident.created_at,
        updated_at: incident.updated_at,
        resolved_at: incident.resolved_at,
    }
}

fn parse_filter(query: &IncidentListQuery) -> Result<IncidentFilter, CoreError> {
    match &query.status {
        None => Ok(IncidentFilter::Active),
        Some(value) => IncidentStatus::parse(value)
            .map(IncidentFilter::Status)
            .ok_or_else(|| CoreError::validation(format!("unknown status filter: {}", value))),
    }
}

// ==================
// Handlers
// ==================

async fn list_incidents_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<IncidentListQuery>,
) -> Result<Json<IncidentsListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let filter = parse_filter(&query).map_err(|e| core_error_response(&e))?;
    let incidents = state
        .ledger
        .list(filter)
        .map_err(|e| core_error_response(&e))?;

    let incidents: Vec<IncidentResponse> = incidents
        .into_iter()
        .map(|incident| resolve_summaries(&state, incident))
        .collect();

    Ok(Json(IncidentsListResponse {
        total: incidents.len(),
        incidents,
    }))
}

async fn get_incident_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<IncidentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let incident = state.ledger.get(id).map_err(|e| core_error_response(&e))?;
    Ok(Json(resolve_summaries(&state, incident)))
}

async fn create_incident_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<NewIncident>,
) -> Result<(StatusCode, Json<IncidentResponse>), (StatusCode, Json<ErrorResponse>)> {
    require_admin(&headers, &state)?;

    let incident = state
        .ledger
        .open(request)
        .map_err(|e| core_error_response(&e))?;

    state.metrics.increment_incidents_opened();
    if !incident.affected_services.is_empty() {
        state.metrics.increment_cascades();
    }
    Ok((
        StatusCode::CREATED,
        Json(resolve_summaries(&state, incident)),
    ))
}

async fn update_incident_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<IncidentPatch>,
) -> Result<Json<IncidentResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_admin(&headers, &state)?;

    let was_resolved = state
        .ledger
        .get(id)
        .map(|incident| incident.is_resolved())
        .unwrap_or(false);
    let appended_entry = patch.update_message.is_some();

    let incident = state
        .ledger
        .update(id, patch)
        .map_err(|e| core_error_response(&e))?;

    if !was_resolved && incident.is_resolved() {
        state.metrics.increment_incidents_resolved();
        state.metrics.increment_cascades();
    }
    if appended_entry {
        state.metrics.increment_log_entries();
    }
    Ok(Json(resolve_summaries(&state, incident)))
}

async fn delete_incident_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_admin(&headers, &state)?;

    state
        .ledger
        .delete(id)
        .map_err(|e| core_error_response(&e))?;

    state.metrics.increment_incidents_deleted();
    Ok(Json(MessageResponse {
        message: "Incident removed".to_string(),
    }))
}
