//! Persistence Collaborator
//!
//! The engine talks to durable storage through the two repository traits in
//! this module. The engine validates before it writes; multi-record atomicity
//! within one logical operation is the collaborator's responsibility, and a
//! [`StoreError`] aborts the whole operation with no partial rollback here.

mod memory;

pub use memory::{InMemoryIncidentStore, InMemoryServiceStore};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::core::incident::{Incident, IncidentFilter};
use crate::core::service::{Service, ServiceStatus};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque failure from the persistence collaborator
///
/// Surfaced to API callers as a generic failure; the detail stays in logs.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected write: {0}")]
    WriteFailed(String),
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a write failure
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }
}

/// Durable storage of service records
pub trait ServiceStore: Send + Sync {
    /// Insert a new record
    fn insert(&self, service: &Service) -> StoreResult<()>;

    /// Fetch one record by id
    fn fetch(&self, id: Uuid) -> StoreResult<Option<Service>>;

    /// Fetch one record by its unique name
    fn fetch_by_name(&self, name: &str) -> StoreResult<Option<Service>>;

    /// Fetch every record whose id is in `ids`; missing ids are skipped
    fn fetch_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Service>>;

    /// All records ordered by name ascending
    fn list(&self) -> StoreResult<Vec<Service>>;

    /// Overwrite an existing record
    fn save(&self, service: &Service) -> StoreResult<()>;

    /// Remove a record; returns whether it existed
    fn remove(&self, id: Uuid) -> StoreResult<bool>;

    /// Batch existence check: the subset of `ids` with no record
    ///
    /// One round trip, so the validate-before-mutate step stays atomic with
    /// respect to concurrent deletions.
    fn filter_missing(&self, ids: &[Uuid]) -> StoreResult<Vec<Uuid>>;

    /// Batch status write for a cascade pass, stamping `updated_at` to `at`
    fn set_status_many(
        &self,
        ids: &[Uuid],
        status: ServiceStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<()>;
}

/// Durable storage of incident records
pub trait IncidentStore: Send + Sync {
    /// Insert a new record
    fn insert(&self, incident: &Incident) -> StoreResult<()>;

    /// Fetch one record by id
    fn fetch(&self, id: Uuid) -> StoreResult<Option<Incident>>;

    /// Matching records ordered by creation time, newest first
    fn list(&self, filter: IncidentFilter) -> StoreResult<Vec<Incident>>;

    /// Overwrite an existing record
    fn save(&self, incident: &Incident) -> StoreResult<()>;

    /// Remove a record; returns whether it existed
    fn remove(&self, id: Uuid) -> StoreResult<bool>;

    /// Ids of incidents (any status) whose affected set contains `service_id`
    ///
    /// Reverse lookups are computed by scan; services carry no back-pointers.
    fn referencing(&self, service_id: Uuid) -> StoreResult<Vec<Uuid>>;
}
