//! Refresh Sessions
//!
//! Refresh tokens are single-use and stored only as hashes. Rotating a token
//! revokes the old session; logout invalidates immediately.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::crypto::{constant_time_str_eq, generate_token, hash_token};
use super::errors::{AuthError, AuthResult};

/// One issued refresh token
#[derive(Debug, Clone)]
struct SessionEntry {
    admin_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
}

/// Session store configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_token_ttl: Duration::days(30),
        }
    }
}

/// In-memory store of hashed refresh tokens
pub struct SessionStore {
    config: SessionConfig,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a fresh refresh token for an admin
    ///
    /// Returns the raw token; only its hash is retained.
    pub fn issue(&self, admin_id: Uuid) -> String {
        let raw_token = generate_token();
        let entry = SessionEntry {
            admin_id,
            token_hash: hash_token(&raw_token),
            expires_at: Utc::now() + self.config.refresh_token_ttl,
        };

        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(Uuid::new_v4(), entry);
        raw_token
    }

    /// Rotate a refresh token: consume the presented one, issue a new one
    ///
    /// Refresh tokens are single-use; the matched session is removed whether
    /// or not it is still valid.
    pub fn rotate(&self, raw_token: &str) -> AuthResult<(Uuid, String)> {
        let presented_hash = hash_token(raw_token);

        let entry = {
            let mut sessions = self.sessions.write().unwrap();
            let matched = sessions
                .iter()
                .find(|(_, entry)| constant_time_str_eq(&entry.token_hash, &presented_hash))
                .map(|(id, _)| *id);
            match matched.and_then(|id| sessions.remove(&id)) {
                Some(entry) => entry,
                None => return Err(AuthError::InvalidRefreshToken),
            }
        };

        if entry.expires_at < Utc::now() {
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok((entry.admin_id, self.issue(entry.admin_id)))
    }

    /// Revoke a refresh token (logout)
    pub fn revoke(&self, raw_token: &str) -> AuthResult<()> {
        let presented_hash = hash_token(raw_token);

        let mut sessions = self.sessions.write().unwrap();
        let matched = sessions
            .iter()
            .find(|(_, entry)| constant_time_str_eq(&entry.token_hash, &presented_hash))
            .map(|(id, _)| *id);
        match matched {
            Some(id) => {
                sessions.remove(&id);
                Ok(())
            }
            None => Err(AuthError::InvalidRefreshToken),
        }
    }

    /// Drop expired sessions
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap();
        sessions.retain(|_, entry| entry.expires_at > now);
    }
}
