//! Service Registry
//!
//! Owns the Service lifecycle: CRUD plus the referential-integrity check that
//! blocks deleting a service any incident still points at. No side effects
//! beyond the record itself; the `status` field set through [`update`] is the
//! manual administrative override, distinct from cascade-driven mutation.
//!
//! [`update`]: ServiceRegistry::update

use std::sync::Arc;

use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::store::{IncidentStore, ServiceStore};

use super::clock::Clock;
use super::error::{CoreError, CoreResult, ResourceKind};
use super::service::{NewService, Service, ServicePatch};

const DEFAULT_UPTIME: &str = "100%";

/// Service CRUD with referential-integrity checks
pub struct ServiceRegistry<S: ServiceStore, I: IncidentStore> {
    services: Arc<S>,
    incidents: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<S: ServiceStore, I: IncidentStore> ServiceRegistry<S, I> {
    pub fn new(services: Arc<S>, incidents: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            services,
            incidents,
            clock,
        }
    }

    /// Create a service; the name must be unused
    pub fn create(&self, request: NewService) -> CoreResult<Service> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::validation("service name is required"));
        }
        if self.services.fetch_by_name(&name)?.is_some() {
            return Err(CoreError::conflict(format!(
                "service name already exists: {}",
                name
            )));
        }

        let service = Service::new(
            name,
            request.status.unwrap_or_default(),
            request.uptime.unwrap_or_else(|| DEFAULT_UPTIME.to_string()),
            self.clock.now(),
        );
        self.services.insert(&service)?;

        log_event_with_fields(
            Event::ServiceCreated,
            &[("id", &service.id.to_string()), ("name", &service.name)],
        );
        Ok(service)
    }

    /// Apply only the present fields of `patch`
    ///
    /// Writing `status` here is the manual override path; it bypasses the
    /// cascade entirely.
    pub fn update(&self, id: Uuid, patch: ServicePatch) -> CoreResult<Service> {
        let mut service = self
            .services
            .fetch(id)?
            .ok_or_else(|| CoreError::not_found(ResourceKind::Service, id))?;

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CoreError::validation("service name is required"));
            }
            if let Some(other) = self.services.fetch_by_name(&name)? {
                if other.id != id {
                    return Err(CoreError::conflict(format!(
                        "service name already exists: {}",
                        name
                    )));
                }
            }
            service.name = name;
        }
        if let Some(status) = patch.status {
            service.status = status;
        }
        if let Some(uptime) = patch.uptime {
            service.uptime = uptime;
        }

        service.updated_at = self.clock.now();
        self.services.save(&service)?;

        log_event_with_fields(Event::ServiceUpdated, &[("id", &service.id.to_string())]);
        Ok(service)
    }

    /// Delete a service no incident references
    ///
    /// Any referencing incident blocks deletion regardless of its status;
    /// a resolved incident still pins the services its history names.
    pub fn delete(&self, id: Uuid) -> CoreResult<()> {
        if self.services.fetch(id)?.is_none() {
            return Err(CoreError::not_found(ResourceKind::Service, id));
        }

        let referencing = self.incidents.referencing(id)?;
        if !referencing.is_empty() {
            let ids: Vec<String> = referencing.iter().map(Uuid::to_string).collect();
            return Err(CoreError::conflict(format!(
                "service {} is referenced by incident(s): {}",
                id,
                ids.join(", ")
            )));
        }

        self.services.remove(id)?;
        log_event_with_fields(Event::ServiceDeleted, &[("id", &id.to_string())]);
        Ok(())
    }

    /// All services, name ascending
    pub fn list(&self) -> CoreResult<Vec<Service>> {
        Ok(self.services.list()?)
    }

    /// One service by id
    pub fn get(&self, id: Uuid) -> CoreResult<Service> {
        self.services
            .fetch(id)?
            .ok_or_else(|| CoreError::not_found(ResourceKind::Service, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::incident::{Incident, Severity};
    use crate::core::service::ServiceStatus;
    use crate::store::{InMemoryIncidentStore, InMemoryServiceStore};
    use chrono::{Duration, TimeZone, Utc};

    type Registry = ServiceRegistry<InMemoryServiceStore, InMemoryIncidentStore>;

    fn fixture() -> (Registry, Arc<InMemoryIncidentStore>, Arc<ManualClock>) {
        let services = Arc::new(InMemoryServiceStore::new());
        let incidents = Arc::new(InMemoryIncidentStore::new());
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        (
            ServiceRegistry::new(services, incidents.clone(), clock.clone()),
            incidents,
            clock,
        )
    }

    fn new_service(name: &str) -> NewService {
        NewService {
            name: name.to_string(),
            status: None,
            uptime: None,
        }
    }

    #[test]
    fn test_create_defaults() {
        let (registry, _, clock) = fixture();
        let service = registry.create(new_service("API")).unwrap();

        assert_eq!(service.status, ServiceStatus::Operational);
        assert_eq!(service.uptime, "100%");
        assert_eq!(service.created_at, clock.now());
    }

    #[test]
    fn test_create_duplicate_name_conflicts() {
        let (registry, _, _) = fixture();
        registry.create(new_service("API")).unwrap();

        let err = registry.create(new_service("API")).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn test_create_empty_name_rejected() {
        let (registry, _, _) = fixture();
        let err = registry.create(new_service("   ")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let (registry, _, clock) = fixture();
        let service = registry.create(new_service("API")).unwrap();

        clock.advance(Duration::minutes(1));
        let updated = registry
            .update(
                service.id,
                ServicePatch {
                    uptime: Some("99.9%".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "API");
        assert_eq!(updated.uptime, "99.9%");
        assert_eq!(updated.updated_at, clock.now());
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn test_update_status_is_manual_override() {
        let (registry, _, _) = fixture();
        let service = registry.create(new_service("API")).unwrap();

        let updated = registry
            .update(
                service.id,
                ServicePatch {
                    status: Some(ServiceStatus::Outage),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, ServiceStatus::Outage);
    }

    #[test]
    fn test_update_rename_onto_taken_name_conflicts() {
        let (registry, _, _) = fixture();
        registry.create(new_service("API")).unwrap();
        let other = registry.create(new_service("CDN")).unwrap();

        let err = registry
            .update(
                other.id,
                ServicePatch {
                    name: Some("API".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        // Renaming to its own name is fine
        registry
            .update(
                other.id,
                ServicePatch {
                    name: Some("CDN".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
    }

    #[test]
    fn test_update_unknown_id_not_found() {
        let (registry, _, _) = fixture();
        let err = registry
            .update(Uuid::new_v4(), ServicePatch::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_delete_blocked_by_referencing_incident() {
        let (registry, incidents, clock) = fixture();
        let service = registry.create(new_service("API")).unwrap();

        let incident = Incident::open(
            "t".to_string(),
            "d".to_string(),
            Severity::Minor,
            vec![service.id],
            clock.now(),
        );
        incidents.insert(&incident).unwrap();

        let err = registry.delete(service.id).unwrap_err();
        match err {
            CoreError::Conflict(msg) => assert!(msg.contains(&incident.id.to_string())),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_unreferenced_service_disappears_from_list() {
        let (registry, _, _) = fixture();
        let service = registry.create(new_service("API")).unwrap();
        registry.create(new_service("CDN")).unwrap();

        registry.delete(service.id).unwrap();

        let names: Vec<String> = registry.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["CDN"]);
        assert!(matches!(
            registry.get(service.id).unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_list_sorted_by_name() {
        let (registry, _, _) = fixture();
        for name in ["gateway", "api", "cdn"] {
            registry.create(new_service(name)).unwrap();
        }
        let names: Vec<String> = registry.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["api", "cdn", "gateway"]);
    }
}
