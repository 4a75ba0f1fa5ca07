//! Aggregate Status
//!
//! Derives the single system-wide banner status from the current service set
//! for the public status page. Pure read, recomputed on every call; nothing is
//! persisted.

use std::sync::Arc;

use crate::store::ServiceStore;

use super::error::CoreResult;
use super::service::ServiceStatus;

/// Computes the worst-case status across all services
pub struct AggregateStatusComputer<S: ServiceStore> {
    services: Arc<S>,
}

impl<S: ServiceStore> AggregateStatusComputer<S> {
    pub fn new(services: Arc<S>) -> Self {
        Self { services }
    }

    /// Any outage wins, else any degradation, else operational
    ///
    /// An empty service set reads as operational.
    pub fn compute(&self) -> CoreResult<ServiceStatus> {
        let services = self.services.list()?;
        let mut overall = ServiceStatus::Operational;
        for service in &services {
            match service.status {
                ServiceStatus::Outage => return Ok(ServiceStatus::Outage),
                ServiceStatus::Degraded => overall = ServiceStatus::Degraded,
                ServiceStatus::Operational => {}
            }
        }
        Ok(overall)
    }
}
