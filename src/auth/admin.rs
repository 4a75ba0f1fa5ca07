//! Admin Accounts
//!
//! Administrator model and repository. Admins are the only principals; they
//! gate every mutating endpoint of the status API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::crypto::{hash_password, validate_password, verify_password, PasswordPolicy};
use super::errors::AuthResult;

/// Administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    /// Unique admin identifier
    pub id: Uuid,

    /// Email address (unique)
    pub email: String,

    /// Argon2id password hash (never plaintext)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    /// Create a new admin with the given email and password
    pub fn new(email: String, password: &str, policy: &PasswordPolicy) -> AuthResult<Self> {
        validate_password(password, policy)?;
        let password_hash = hash_password(password)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Verify a password against this admin's stored hash
    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }
}

/// Admin registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Admin login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin repository trait
///
/// Abstracts storage operations for admin accounts.
pub trait AdminRepository: Send + Sync {
    /// Find an admin by their ID
    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Admin>>;

    /// Find an admin by their email
    fn find_by_email(&self, email: &str) -> AuthResult<Option<Admin>>;

    /// Check if an email is already registered
    fn email_exists(&self, email: &str) -> AuthResult<bool>;

    /// Create a new admin
    fn create(&self, admin: &Admin) -> AuthResult<()>;
}

/// In-memory admin repository
#[derive(Debug, Default)]
pub struct InMemoryAdminRepository {
    admins: std::sync::RwLock<Vec<Admin>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdminRepository for InMemoryAdminRepository {
    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Admin>> {
        let admins = self.admins.read().unwrap();
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> AuthResult<Option<Admin>> {
        let admins = self.admins.read().unwrap();
        Ok(admins.iter().find(|a| a.email == email).cloned())
    }

    fn email_exists(&self, email: &str) -> AuthResult<bool> {
        let admins = self.admins.read().unwrap();
        Ok(admins.iter().any(|a| a.email == email))
    }

    fn create(&self, admin: &Admin) -> AuthResult<()> {
        let mut admins = self.admins.write().unwrap();
        admins.push(admin.clone());
        Ok(())
    }
}
