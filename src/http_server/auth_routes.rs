//! Auth HTTP Routes
//!
//! Registration, login and token lifecycle for the admin surface.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::{
    Admin, AuthService, InMemoryAdminRepository, JwtConfig, LoginRequest, PasswordPolicy,
    RegisterRequest, SessionConfig,
};

use super::{auth_error_response, ErrorResponse};

/// Shared auth state
pub struct AuthState {
    pub service: AuthService<InMemoryAdminRepository>,
}

impl AuthState {
    /// Create auth state over a fresh admin repository
    pub fn new(jwt_config: JwtConfig, session_config: SessionConfig) -> Self {
        Self {
            service: AuthService::new(
                Arc::new(InMemoryAdminRepository::new()),
                jwt_config,
                session_config,
                PasswordPolicy::default(),
            ),
        }
    }
}

/// Auth routes with shared state
pub fn auth_routes(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub admin: AdminResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

impl From<&Admin> for AdminResponse {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.to_string(),
            email: admin.email.clone(),
            created_at: admin.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
}

// ==================
// Handlers
// ==================

async fn register_handler(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorResponse>)> {
    let (admin, tokens) = state
        .service
        .register(request)
        .map_err(|e| auth_error_response(&e))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            admin: AdminResponse::from(&admin),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        }),
    ))
}

async fn login_handler(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (admin, tokens) = state
        .service
        .login(request)
        .map_err(|e| auth_error_response(&e))?;

    Ok(Json(AuthResponse {
        admin: AdminResponse::from(&admin),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

async fn refresh_handler(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, (StatusCode, Json<ErrorResponse>)> {
    let tokens = state
        .service
        .refresh(&request.refresh_token)
        .map_err(|e| auth_error_response(&e))?;

    Ok(Json(RefreshResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

async fn logout_handler(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .logout(&request.refresh_token)
        .map_err(|e| auth_error_response(&e))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn me_handler(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            auth_error_response(&crate::auth::AuthError::AuthenticationRequired)
        })?;

    let claims = state
        .service
        .verify(token)
        .map_err(|e| auth_error_response(&e))?;

    Ok(Json(MeResponse {
        id: claims.sub,
        email: claims.email,
    }))
}
