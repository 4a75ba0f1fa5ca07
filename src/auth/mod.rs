//! Admin authentication
//!
//! Credential issuance for the admin surface: argon2id password hashing,
//! short-lived JWT access tokens and single-use refresh tokens. The engine
//! itself never sees credentials; the HTTP layer asks this module whether a
//! bearer token grants mutation.

pub mod admin;
pub mod api;
pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod session;

pub use admin::{Admin, AdminRepository, InMemoryAdminRepository, LoginRequest, RegisterRequest};
pub use api::AuthService;
pub use crypto::PasswordPolicy;
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager, TokenResponse};
pub use session::{SessionConfig, SessionStore};
