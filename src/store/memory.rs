//! In-Memory Store Bindings
//!
//! `RwLock<HashMap>` implementations of the repository traits. These are the
//! default bindings for a single-node deployment and for tests; a durable
//! collaborator implements the same traits.
//!
//! Listing order is deterministic: services by name, incidents newest first
//! with id as tie-break.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::incident::{Incident, IncidentFilter};
use crate::core::service::{Service, ServiceStatus};

use super::{IncidentStore, ServiceStore, StoreResult};

/// In-memory service store
#[derive(Debug, Default)]
pub struct InMemoryServiceStore {
    records: RwLock<HashMap<Uuid, Service>>,
}

impl InMemoryServiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceStore for InMemoryServiceStore {
    fn insert(&self, service: &Service) -> StoreResult<()> {
        let mut records = self.records.write().unwrap();
        records.insert(service.id, service.clone());
        Ok(())
    }

    fn fetch(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let records = self.records.read().unwrap();
        Ok(records.get(&id).cloned())
    }

    fn fetch_by_name(&self, name: &str) -> StoreResult<Option<Service>> {
        let records = self.records.read().unwrap();
        Ok(records.values().find(|s| s.name == name).cloned())
    }

    fn fetch_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Service>> {
        let records = self.records.read().unwrap();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    fn list(&self) -> StoreResult<Vec<Service>> {
        let records = self.records.read().unwrap();
        let mut services: Vec<Service> = records.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    fn save(&self, service: &Service) -> StoreResult<()> {
        let mut records = self.records.write().unwrap();
        records.insert(service.id, service.clone());
        Ok(())
    }

    fn remove(&self, id: Uuid) -> StoreResult<bool> {
        let mut records = self.records.write().unwrap();
        Ok(records.remove(&id).is_some())
    }

    fn filter_missing(&self, ids: &[Uuid]) -> StoreResult<Vec<Uuid>> {
        let records = self.records.read().unwrap();
        Ok(ids
            .iter()
            .filter(|id| !records.contains_key(id))
            .copied()
            .collect())
    }

    fn set_status_many(
        &self,
        ids: &[Uuid],
        status: ServiceStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut records = self.records.write().unwrap();
        for id in ids {
            if let Some(service) = records.get_mut(id) {
                service.status = status;
                service.updated_at = at;
            }
        }
        Ok(())
    }
}

/// In-memory incident store
#[derive(Debug, Default)]
pub struct InMemoryIncidentStore {
    records: RwLock<HashMap<Uuid, Incident>>,
}

impl InMemoryIncidentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IncidentStore for InMemoryIncidentStore {
    fn insert(&self, incident: &Incident) -> StoreResult<()> {
        let mut records = self.records.write().unwrap();
        records.insert(incident.id, incident.clone());
        Ok(())
    }

    fn fetch(&self, id: Uuid) -> StoreResult<Option<Incident>> {
        let records = self.records.read().unwrap();
        Ok(records.get(&id).cloned())
    }

    fn list(&self, filter: IncidentFilter) -> StoreResult<Vec<Incident>> {
        let records = self.records.read().unwrap();
        let mut incidents: Vec<Incident> = records
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        incidents.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(incidents)
    }

    fn save(&self, incident: &Incident) -> StoreResult<()> {
        let mut records = self.records.write().unwrap();
        records.insert(incident.id, incident.clone());
        Ok(())
    }

    fn remove(&self, id: Uuid) -> StoreResult<bool> {
        let mut records = self.records.write().unwrap();
        Ok(records.remove(&id).is_some())
    }

    fn referencing(&self, service_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let records = self.records.read().unwrap();
        let mut ids: Vec<Uuid> = records
            .values()
            .filter(|i| i.affected_services.contains(&service_id))
            .map(|i| i.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
