//! Core Error Types
//!
//! Unified error handling for the status-consistency engine.
//!
//! All reference and field validation runs to completion before any mutation
//! begins, so every error here is raised before a partial write can exist.
//! A `Store` error during a multi-step operation aborts the whole operation;
//! the persistence collaborator is responsible for multi-record atomicity.

use std::fmt;

use uuid::Uuid;

use crate::store::StoreError;

/// Core module result type
pub type CoreResult<T> = Result<T, CoreError>;

/// The kind of record an identifier failed to resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Service,
    Incident,
}

impl ResourceKind {
    /// Returns the lowercase resource name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Service => "service",
            ResourceKind::Incident => "incident",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Core error type
#[derive(Debug)]
pub enum CoreError {
    /// An identifier did not resolve to a record
    NotFound { kind: ResourceKind, id: Uuid },

    /// One or more affected-service references did not resolve
    InvalidReference { missing: Vec<Uuid> },

    /// The operation conflicts with existing state
    Conflict(String),

    /// A required field is missing or malformed
    Validation(String),

    /// Opaque failure from the persistence collaborator
    Store(StoreError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{} not found: {}", kind, id),
            Self::InvalidReference { missing } => {
                let ids: Vec<String> = missing.iter().map(Uuid::to_string).collect();
                write!(f, "unknown affected service(s): {}", ids.join(", "))
            }
            Self::Conflict(msg) => write!(f, "conflict: {}", msg),
            Self::Validation(msg) => write!(f, "validation error: {}", msg),
            Self::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl CoreError {
    /// Create a not found error
    pub fn not_found(kind: ResourceKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Create an invalid reference error listing every offending id
    pub fn invalid_reference(missing: Vec<Uuid>) -> Self {
        Self::InvalidReference { missing }
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidReference { .. } => "INVALID_REFERENCE",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidReference { .. } => 400,
            Self::Conflict(_) => 409,
            Self::Validation(_) => 400,
            Self::Store(_) => 500,
        }
    }

    /// Message safe to surface to API callers
    ///
    /// Store failures are reported without internal detail.
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "internal storage failure".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
