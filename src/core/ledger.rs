//! Incident Ledger
//!
//! Owns the Incident lifecycle and its append-only narrative log, and
//! orchestrates the cascades each lifecycle change triggers.
//!
//! Every mutation validates all references and fields to completion, then
//! computes the full cascade plan, and only then writes: record first, plan
//! second. Mutations on one incident id are serialized through a per-record
//! lock so two concurrent updates cannot interleave their sub-steps.
//! Cross-incident writes to a shared service stay last-write-wins (see
//! [`propagator`](super::propagator)).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::store::{IncidentStore, ServiceStore};

use super::clock::Clock;
use super::error::{CoreError, CoreResult, ResourceKind};
use super::incident::{Incident, IncidentFilter, IncidentPatch, IncidentStatus, NewIncident};
use super::propagator::{CascadePlan, StatusPropagator};

/// Incident lifecycle orchestration
pub struct IncidentLedger<S: ServiceStore, I: IncidentStore> {
    incidents: Arc<I>,
    services: Arc<S>,
    propagator: StatusPropagator<S>,
    clock: Arc<dyn Clock>,
    write_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: ServiceStore, I: IncidentStore> IncidentLedger<S, I> {
    pub fn new(services: Arc<S>, incidents: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            incidents,
            propagator: StatusPropagator::new(services.clone(), clock.clone()),
            services,
            clock,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Open an incident and escalate its affected services
    ///
    /// All affected ids are validated in one batch before anything is
    /// written. The narrative log starts with the single reporting entry.
    pub fn open(&self, request: NewIncident) -> CoreResult<Incident> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(CoreError::validation("incident title is required"));
        }
        let description = request.description.trim().to_string();
        if description.is_empty() {
            return Err(CoreError::validation("incident description is required"));
        }

        let affected = dedupe_ids(request.affected_services);
        let missing = self.services.filter_missing(&affected)?;
        if !missing.is_empty() {
            return Err(CoreError::invalid_reference(missing));
        }

        let severity = request.severity.unwrap_or_default();
        let incident = Incident::open(title, description, severity, affected, self.clock.now());

        let plan = CascadePlan::escalate(&incident.affected_services, severity);
        self.incidents.insert(&incident)?;
        self.propagator.apply(&plan)?;

        log_event_with_fields(
            Event::IncidentOpened,
            &[
                ("id", &incident.id.to_string()),
                ("severity", incident.severity.as_str()),
                ("services", &incident.affected_services.len().to_string()),
            ],
        );
        Ok(incident)
    }

    /// Apply a patch to one incident as one logical unit
    ///
    /// Field edits, the membership diff, the optional log append and the
    /// triggered cascades either all apply or none do: validation and plan
    /// computation complete before the first write.
    pub fn update(&self, id: Uuid, patch: IncidentPatch) -> CoreResult<Incident> {
        let lock = self.record_lock(id);
        let _guard = lock.lock().unwrap();

        let mut incident = self
            .incidents
            .fetch(id)?
            .ok_or_else(|| CoreError::not_found(ResourceKind::Incident, id))?;

        // Validation pass: nothing below may write until this block is done.
        let title = match patch.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(CoreError::validation("incident title is required"));
                }
                Some(title)
            }
            None => None,
        };
        let description = match patch.description {
            Some(description) => {
                let description = description.trim().to_string();
                if description.is_empty() {
                    return Err(CoreError::validation("incident description is required"));
                }
                Some(description)
            }
            None => None,
        };
        let update_message = match patch.update_message {
            Some(message) => {
                let message = message.trim().to_string();
                if message.is_empty() {
                    return Err(CoreError::validation("update message is required"));
                }
                Some(message)
            }
            None => None,
        };
        let new_affected = match patch.affected_services {
            Some(ids) => {
                let ids = dedupe_ids(ids);
                let missing = self.services.filter_missing(&ids)?;
                if !missing.is_empty() {
                    return Err(CoreError::invalid_reference(missing));
                }
                Some(ids)
            }
            None => None,
        };

        // Plan pass: the full effect set, against the pre-patch record.
        let resolving =
            patch.status == Some(IncidentStatus::Resolved) && !incident.is_resolved();
        let mut plan = CascadePlan::default();
        if resolving {
            // Resolution acts on the current set, before any membership change
            // carried by the same call.
            plan = plan.merge(CascadePlan::reset(&incident.affected_services));
        }
        if let Some(new_ids) = &new_affected {
            let removed: Vec<Uuid> = incident
                .affected_services
                .iter()
                .filter(|id| !new_ids.contains(id))
                .copied()
                .collect();
            let added: Vec<Uuid> = new_ids
                .iter()
                .filter(|id| !incident.affected_services.contains(id))
                .copied()
                .collect();
            let severity_after = patch.severity.unwrap_or(incident.severity);
            plan = plan
                .merge(CascadePlan::reset(&removed))
                .merge(CascadePlan::escalate(&added, severity_after));
        }

        // Apply pass.
        let now = self.clock.now();
        if let Some(title) = title {
            incident.title = title;
        }
        if let Some(description) = description {
            incident.description = description;
        }
        if let Some(severity) = patch.severity {
            incident.severity = severity;
        }
        if let Some(status) = patch.status {
            if resolving {
                incident.resolved_at = Some(now);
            } else if incident.is_resolved() && status != IncidentStatus::Resolved {
                // resolved_at is present iff the incident is resolved
                incident.resolved_at = None;
            }
            incident.status = status;
        }
        if let Some(new_ids) = new_affected {
            incident.affected_services = new_ids;
        }
        if let Some(message) = update_message {
            incident.append_update(message, now);
        }
        incident.updated_at = now;

        self.incidents.save(&incident)?;
        self.propagator.apply(&plan)?;

        if resolving {
            log_event_with_fields(Event::IncidentResolved, &[("id", &id.to_string())]);
        } else {
            log_event_with_fields(Event::IncidentUpdated, &[("id", &id.to_string())]);
        }
        Ok(incident)
    }

    /// Delete an incident, resetting its affected services unconditionally
    pub fn delete(&self, id: Uuid) -> CoreResult<()> {
        let lock = self.record_lock(id);
        {
            let _guard = lock.lock().unwrap();

            let incident = self
                .incidents
                .fetch(id)?
                .ok_or_else(|| CoreError::not_found(ResourceKind::Incident, id))?;

            let plan = CascadePlan::reset(&incident.affected_services);
            self.propagator.apply(&plan)?;
            self.incidents.remove(id)?;
        }
        self.write_locks.lock().unwrap().remove(&id);

        log_event_with_fields(Event::IncidentDeleted, &[("id", &id.to_string())]);
        Ok(())
    }

    /// One incident by id
    pub fn get(&self, id: Uuid) -> CoreResult<Incident> {
        self.incidents
            .fetch(id)?
            .ok_or_else(|| CoreError::not_found(ResourceKind::Incident, id))
    }

    /// Matching incidents, newest first
    pub fn list(&self, filter: IncidentFilter) -> CoreResult<Vec<Incident>> {
        Ok(self.incidents.list(filter)?)
    }

    /// The lock serializing mutations on one incident id
    fn record_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap();
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn dedupe_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::incident::Severity;
    use crate::core::service::{Service, ServiceStatus};
    use crate::store::{InMemoryIncidentStore, InMemoryServiceStore};
    use chrono::{Duration, TimeZone, Utc};

    type Ledger = IncidentLedger<InMemoryServiceStore, InMemoryIncidentStore>;

    struct Fixture {
        ledger: Ledger,
        services: Arc<InMemoryServiceStore>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let services = Arc::new(InMemoryServiceStore::new());
        let incidents = Arc::new(InMemoryIncidentStore::new());
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        Fixture {
            ledger: IncidentLedger::new(services.clone(), incidents, clock.clone()),
            services,
            clock,
        }
    }

    impl Fixture {
        fn service(&self, name: &str) -> Uuid {
            let service = Service::new(
                name.to_string(),
                ServiceStatus::Operational,
                "100%".to_string(),
                self.clock.now(),
            );
            self.services.insert(&service).unwrap();
            service.id
        }

        fn status_of(&self, id: Uuid) -> ServiceStatus {
            self.services.fetch(id).unwrap().unwrap().status
        }
    }

    fn new_incident(affected: Vec<Uuid>, severity: Severity) -> NewIncident {
        NewIncident {
            title: "DB down".to_string(),
            description: "database errors".to_string(),
            severity: Some(severity),
            affected_services: affected,
        }
    }

    #[test]
    fn test_open_escalates_and_seeds_log() {
        let fx = fixture();
        let api = fx.service("API");

        let incident = fx
            .ledger
            .open(new_incident(vec![api], Severity::Critical))
            .unwrap();

        assert_eq!(fx.status_of(api), ServiceStatus::Outage);
        assert_eq!(incident.status, IncidentStatus::Investigating);
        assert_eq!(incident.updates.len(), 1);
        assert_eq!(
            incident.updates[0].message,
            "Incident reported: database errors"
        );
    }

    #[test]
    fn test_open_with_unknown_reference_writes_nothing() {
        let fx = fixture();
        let api = fx.service("API");
        let ghost_a = Uuid::new_v4();
        let ghost_b = Uuid::new_v4();

        let err = fx
            .ledger
            .open(new_incident(vec![api, ghost_a, ghost_b], Severity::Critical))
            .unwrap_err();

        match err {
            CoreError::InvalidReference { missing } => {
                assert_eq!(missing.len(), 2);
                assert!(missing.contains(&ghost_a));
                assert!(missing.contains(&ghost_b));
            }
            other => panic!("expected invalid reference, got {:?}", other),
        }
        // Validation failed before any mutation: no record, no escalation.
        assert!(fx.ledger.list(IncidentFilter::Active).unwrap().is_empty());
        assert_eq!(fx.status_of(api), ServiceStatus::Operational);
    }

    #[test]
    fn test_open_requires_title_and_description() {
        let fx = fixture();
        for (title, description) in [("", "d"), ("t", ""), ("  ", "d")] {
            let err = fx
                .ledger
                .open(NewIncident {
                    title: title.to_string(),
                    description: description.to_string(),
                    severity: None,
                    affected_services: vec![],
                })
                .unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
    }

    #[test]
    fn test_open_dedupes_affected_ids() {
        let fx = fixture();
        let api = fx.service("API");

        let incident = fx
            .ledger
            .open(new_incident(vec![api, api, api], Severity::Minor))
            .unwrap();
        assert_eq!(incident.affected_services, vec![api]);
    }

    #[test]
    fn test_resolve_resets_services_and_stamps_resolved_at() {
        let fx = fixture();
        let api = fx.service("API");
        let incident = fx
            .ledger
            .open(new_incident(vec![api], Severity::Critical))
            .unwrap();
        assert_eq!(fx.status_of(api), ServiceStatus::Outage);

        fx.clock.advance(Duration::minutes(30));
        let resolved = fx
            .ledger
            .update(
                incident.id,
                IncidentPatch {
                    status: Some(IncidentStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(fx.status_of(api), ServiceStatus::Operational);
        assert_eq!(resolved.resolved_at, Some(fx.clock.now()));
        // No update message was supplied: the log is untouched.
        assert_eq!(resolved.updates.len(), 1);
    }

    #[test]
    fn test_re_resolving_changes_nothing() {
        let fx = fixture();
        let api = fx.service("API");
        let incident = fx
            .ledger
            .open(new_incident(vec![api], Severity::Critical))
            .unwrap();

        let first = fx
            .ledger
            .update(
                incident.id,
                IncidentPatch {
                    status: Some(IncidentStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();

        // Escalate the service manually behind the incident's back; a second
        // resolve must not cascade again.
        fx.services
            .set_status_many(&[api], ServiceStatus::Outage, fx.clock.now())
            .unwrap();
        fx.clock.advance(Duration::hours(1));

        let second = fx
            .ledger
            .update(
                incident.id,
                IncidentPatch {
                    status: Some(IncidentStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(second.resolved_at, first.resolved_at);
        assert_eq!(fx.status_of(api), ServiceStatus::Outage);
    }

    #[test]
    fn test_leaving_resolved_clears_resolved_at() {
        let fx = fixture();
        let incident = fx.ledger.open(new_incident(vec![], Severity::Minor)).unwrap();

        fx.ledger
            .update(
                incident.id,
                IncidentPatch {
                    status: Some(IncidentStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();
        let reopened = fx
            .ledger
            .update(
                incident.id,
                IncidentPatch {
                    status: Some(IncidentStatus::Monitoring),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(reopened.status, IncidentStatus::Monitoring);
        assert!(reopened.resolved_at.is_none());
    }

    #[test]
    fn test_membership_diff_resets_removed_escalates_added() {
        let fx = fixture();
        let a = fx.service("A");
        let b = fx.service("B");
        let c = fx.service("C");

        let incident = fx
            .ledger
            .open(new_incident(vec![a, b], Severity::Critical))
            .unwrap();
        assert_eq!(fx.status_of(a), ServiceStatus::Outage);
        assert_eq!(fx.status_of(b), ServiceStatus::Outage);

        fx.ledger
            .update(
                incident.id,
                IncidentPatch {
                    affected_services: Some(vec![b, c]),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(fx.status_of(a), ServiceStatus::Operational);
        assert_eq!(fx.status_of(b), ServiceStatus::Outage); // untouched
        assert_eq!(fx.status_of(c), ServiceStatus::Outage);
    }

    #[test]
    fn test_membership_diff_uses_patched_severity_for_added() {
        let fx = fixture();
        let a = fx.service("A");
        let b = fx.service("B");

        let incident = fx
            .ledger
            .open(new_incident(vec![a], Severity::Critical))
            .unwrap();

        fx.ledger
            .update(
                incident.id,
                IncidentPatch {
                    severity: Some(Severity::Minor),
                    affected_services: Some(vec![a, b]),
                    ..Default::default()
                },
            )
            .unwrap();

        // Added id escalates at the resulting severity, not the old one.
        assert_eq!(fx.status_of(b), ServiceStatus::Degraded);
        // Unchanged member is not re-escalated.
        assert_eq!(fx.status_of(a), ServiceStatus::Outage);
    }

    #[test]
    fn test_update_message_appends_post_patch_status() {
        let fx = fixture();
        let incident = fx.ledger.open(new_incident(vec![], Severity::Minor)).unwrap();

        let updated = fx
            .ledger
            .update(
                incident.id,
                IncidentPatch {
                    status: Some(IncidentStatus::Identified),
                    update_message: Some("root cause found".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.updates.len(), 2);
        let entry = updated.updates.last().unwrap();
        assert_eq!(entry.message, "root cause found");
        assert_eq!(entry.status, IncidentStatus::Identified);
    }

    #[test]
    fn test_update_message_alone_appends_exactly_one_entry() {
        let fx = fixture();
        let incident = fx.ledger.open(new_incident(vec![], Severity::Minor)).unwrap();

        for n in 1..=3usize {
            let updated = fx
                .ledger
                .update(
                    incident.id,
                    IncidentPatch {
                        update_message: Some(format!("note {}", n)),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(updated.updates.len(), 1 + n);
        }
    }

    #[test]
    fn test_update_with_invalid_reference_mutates_nothing() {
        let fx = fixture();
        let api = fx.service("API");
        let incident = fx
            .ledger
            .open(new_incident(vec![api], Severity::Critical))
            .unwrap();

        let err = fx
            .ledger
            .update(
                incident.id,
                IncidentPatch {
                    title: Some("new title".to_string()),
                    affected_services: Some(vec![Uuid::new_v4()]),
                    update_message: Some("should not appear".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidReference { .. }));

        let unchanged = fx.ledger.get(incident.id).unwrap();
        assert_eq!(unchanged.title, "DB down");
        assert_eq!(unchanged.updates.len(), 1);
        assert_eq!(fx.status_of(api), ServiceStatus::Outage);
    }

    #[test]
    fn test_delete_resets_services_unconditionally() {
        let fx = fixture();
        let api = fx.service("API");
        let incident = fx
            .ledger
            .open(new_incident(vec![api], Severity::Critical))
            .unwrap();
        assert_eq!(fx.status_of(api), ServiceStatus::Outage);

        fx.ledger.delete(incident.id).unwrap();

        assert_eq!(fx.status_of(api), ServiceStatus::Operational);
        assert!(matches!(
            fx.ledger.get(incident.id).unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_unknown_incident_operations_not_found() {
        let fx = fixture();
        let id = Uuid::new_v4();
        assert!(matches!(
            fx.ledger.get(id).unwrap_err(),
            CoreError::NotFound { .. }
        ));
        assert!(matches!(
            fx.ledger.update(id, IncidentPatch::default()).unwrap_err(),
            CoreError::NotFound { .. }
        ));
        assert!(matches!(
            fx.ledger.delete(id).unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_list_defaults_to_active_incidents() {
        let fx = fixture();
        let first = fx.ledger.open(new_incident(vec![], Severity::Minor)).unwrap();
        fx.clock.advance(Duration::minutes(1));
        let second = fx.ledger.open(new_incident(vec![], Severity::Major)).unwrap();

        fx.ledger
            .update(
                first.id,
                IncidentPatch {
                    status: Some(IncidentStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();

        let active = fx.ledger.list(IncidentFilter::Active).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        let resolved = fx
            .ledger
            .list(IncidentFilter::Status(IncidentStatus::Resolved))
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, first.id);
    }
}
