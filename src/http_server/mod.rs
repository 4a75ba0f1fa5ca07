//! HTTP surface for the status API
//!
//! Thin request routing over the engine: axum routers per resource, a bearer
//! guard in front of every mutating handler, and the shared error shape. All
//! domain rules live in [`crate::core`]; handlers translate between JSON and
//! engine calls.

mod auth_routes;
mod config;
mod incident_routes;
mod server;
mod service_routes;
mod status_routes;

pub use config::HttpServerConfig;
pub use server::HttpServer;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::auth::{AuthError, JwtClaims, JwtManager};
use crate::core::{
    AggregateStatusComputer, CoreError, IncidentLedger, ServiceRegistry, SystemClock,
};
use crate::observability::MetricsRegistry;
use crate::store::{InMemoryIncidentStore, InMemoryServiceStore};

/// Engine state shared by the service, incident and status routers
pub struct ApiState {
    pub registry: ServiceRegistry<InMemoryServiceStore, InMemoryIncidentStore>,
    pub ledger: IncidentLedger<InMemoryServiceStore, InMemoryIncidentStore>,
    pub aggregate: AggregateStatusComputer<InMemoryServiceStore>,
    pub services: Arc<InMemoryServiceStore>,
    pub jwt: JwtManager,
    pub metrics: Arc<MetricsRegistry>,
}

impl ApiState {
    /// Build the engine over fresh in-memory stores
    pub fn new(jwt: JwtManager, metrics: Arc<MetricsRegistry>) -> Self {
        let services = Arc::new(InMemoryServiceStore::new());
        let incidents = Arc::new(InMemoryIncidentStore::new());
        let clock = Arc::new(SystemClock);

        Self {
            registry: ServiceRegistry::new(services.clone(), incidents.clone(), clock.clone()),
            ledger: IncidentLedger::new(services.clone(), incidents, clock),
            aggregate: AggregateStatusComputer::new(services.clone()),
            services,
            jwt,
            metrics,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Plain message response body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Map an engine error onto the wire
///
/// Store failures surface as a generic message; everything else carries the
/// descriptive text including the violating identifiers.
pub(crate) fn core_error_response(err: &CoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.public_message(),
            code: err.code().to_string(),
        }),
    )
}

/// Map an auth error onto the wire
pub(crate) fn auth_error_response(err: &AuthError) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: "AUTH_ERROR".to_string(),
        }),
    )
}

/// Bearer guard for mutating handlers
///
/// Extracts and validates the `Authorization: Bearer <token>` header.
pub(crate) fn require_admin(
    headers: &HeaderMap,
    state: &ApiState,
) -> Result<JwtClaims, (StatusCode, Json<ErrorResponse>)> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => {
            state.metrics.increment_auth_rejected();
            return Err(auth_error_response(&AuthError::AuthenticationRequired));
        }
    };

    state.jwt.validate_token(token).map_err(|err| {
        state.metrics.increment_auth_rejected();
        auth_error_response(&err)
    })
}
