//! Auth Service
//!
//! Combines the admin repository, session store and JWT manager behind the
//! operations the HTTP surface needs: register, login, refresh, logout,
//! verify.

use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event};

use super::admin::{Admin, AdminRepository, LoginRequest, RegisterRequest};
use super::crypto::PasswordPolicy;
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtClaims, JwtConfig, JwtManager, TokenResponse};
use super::session::{SessionConfig, SessionStore};

/// Auth service for the admin surface
pub struct AuthService<R: AdminRepository> {
    admins: Arc<R>,
    sessions: SessionStore,
    jwt: JwtManager,
    password_policy: PasswordPolicy,
}

impl<R: AdminRepository> AuthService<R> {
    pub fn new(
        admins: Arc<R>,
        jwt_config: JwtConfig,
        session_config: SessionConfig,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            admins,
            sessions: SessionStore::new(session_config),
            jwt: JwtManager::new(jwt_config),
            password_policy,
        }
    }

    /// Register a new admin account
    pub fn register(&self, request: RegisterRequest) -> AuthResult<(Admin, TokenResponse)> {
        if self.admins.email_exists(&request.email)? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let admin = Admin::new(request.email, &request.password, &self.password_policy)?;
        self.admins.create(&admin)?;

        let tokens = self.issue_tokens(&admin)?;
        Ok((admin, tokens))
    }

    /// Log an admin in with email and password
    pub fn login(&self, request: LoginRequest) -> AuthResult<(Admin, TokenResponse)> {
        let admin = self
            .admins
            .find_by_email(&request.email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !admin.verify_password(&request.password)? {
            log_event_with_fields(Event::AuthRejected, &[("reason", "bad_password")]);
            return Err(AuthError::InvalidCredentials);
        }

        log_event_with_fields(Event::AuthLogin, &[("admin", &admin.id.to_string())]);
        let tokens = self.issue_tokens(&admin)?;
        Ok((admin, tokens))
    }

    /// Exchange a refresh token for a fresh token pair
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        let (admin_id, new_refresh) = self.sessions.rotate(refresh_token)?;

        let admin = self
            .admins
            .find_by_id(admin_id)?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let access_token = self.jwt.generate_access_token(&admin)?;
        Ok(TokenResponse::new(
            access_token,
            new_refresh,
            self.jwt.expiration(),
        ))
    }

    /// Invalidate a refresh token
    pub fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        self.sessions.revoke(refresh_token)
    }

    /// Validate an access token and return its claims
    pub fn verify(&self, token: &str) -> AuthResult<JwtClaims> {
        self.jwt.validate_token(token)
    }

    /// The JWT manager, for sharing with other routers
    pub fn jwt_manager(&self) -> JwtManager {
        self.jwt.clone()
    }

    fn issue_tokens(&self, admin: &Admin) -> AuthResult<TokenResponse> {
        let access_token = self.jwt.generate_access_token(admin)?;
        let refresh_token = self.sessions.issue(admin.id);
        Ok(TokenResponse::new(
            access_token,
            refresh_token,
            self.jwt.expiration(),
        ))
    }
}
