//! Status-Consistency Engine
//!
//! Keeps an incident's lifecycle, the set of services it affects, each
//! affected service's derived status, and the append-only narrative log
//! mutually consistent as incidents are created, edited, resolved, and
//! deleted.
//!
//! Components, leaves first:
//! - [`ServiceRegistry`]: Service CRUD plus referential integrity
//! - [`IncidentLedger`]: Incident lifecycle orchestration
//! - [`StatusPropagator`]: cascade side effects, planned then applied
//! - [`AggregateStatusComputer`]: the public banner status, read-only

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod incident;
pub mod ledger;
pub mod propagator;
pub mod registry;
pub mod service;

pub use aggregate::AggregateStatusComputer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ResourceKind};
pub use incident::{
    Incident, IncidentFilter, IncidentPatch, IncidentStatus, IncidentUpdate, NewIncident, Severity,
};
pub use ledger::IncidentLedger;
pub use propagator::{CascadePlan, StatusPropagator};
pub use registry::ServiceRegistry;
pub use service::{NewService, Service, ServicePatch, ServiceStatus, ServiceSummary};
