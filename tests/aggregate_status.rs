//! Aggregate Status Tests
//!
//! The banner status is the worst case across all services: any outage wins,
//! else any degradation, else operational. This must hold for every service
//! set, and must track cascades as they land.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use statuspage::core::{
    AggregateStatusComputer, IncidentLedger, IncidentPatch, IncidentStatus, ManualClock,
    NewIncident, NewService, ServiceRegistry, ServiceStatus, Severity,
};
use statuspage::store::{InMemoryIncidentStore, InMemoryServiceStore};

struct Engine {
    registry: ServiceRegistry<InMemoryServiceStore, InMemoryIncidentStore>,
    ledger: IncidentLedger<InMemoryServiceStore, InMemoryIncidentStore>,
    aggregate: AggregateStatusComputer<InMemoryServiceStore>,
}

fn engine() -> Engine {
    let services = Arc::new(InMemoryServiceStore::new());
    let incidents = Arc::new(InMemoryIncidentStore::new());
    let clock = Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));

    Engine {
        registry: ServiceRegistry::new(services.clone(), incidents.clone(), clock.clone()),
        ledger: IncidentLedger::new(services.clone(), incidents, clock),
        aggregate: AggregateStatusComputer::new(services),
    }
}

fn create(engine: &Engine, name: &str, status: ServiceStatus) -> uuid::Uuid {
    engine
        .registry
        .create(NewService {
            name: name.to_string(),
            status: Some(status),
            uptime: None,
        })
        .unwrap()
        .id
}

/// Exhaustive check of the priority law over all three-status combinations.
#[test]
fn test_priority_law_over_all_combinations() {
    let statuses = [
        ServiceStatus::Operational,
        ServiceStatus::Degraded,
        ServiceStatus::Outage,
    ];

    for a in statuses {
        for b in statuses {
            for c in statuses {
                let engine = engine();
                create(&engine, "a", a);
                create(&engine, "b", b);
                create(&engine, "c", c);

                let expected = if [a, b, c].contains(&ServiceStatus::Outage) {
                    ServiceStatus::Outage
                } else if [a, b, c].contains(&ServiceStatus::Degraded) {
                    ServiceStatus::Degraded
                } else {
                    ServiceStatus::Operational
                };

                assert_eq!(
                    engine.aggregate.compute().unwrap(),
                    expected,
                    "set {:?} {:?} {:?}",
                    a,
                    b,
                    c
                );
            }
        }
    }
}

/// No services at all reads as operational.
#[test]
fn test_empty_registry_is_operational() {
    let engine = engine();
    assert_eq!(
        engine.aggregate.compute().unwrap(),
        ServiceStatus::Operational
    );
}

/// The banner tracks incident cascades without any extra bookkeeping: it is
/// recomputed from the service snapshot on every read.
#[test]
fn test_banner_follows_incident_lifecycle() {
    let engine = engine();
    let api = create(&engine, "API", ServiceStatus::Operational);
    create(&engine, "CDN", ServiceStatus::Operational);

    assert_eq!(
        engine.aggregate.compute().unwrap(),
        ServiceStatus::Operational
    );

    let incident = engine
        .ledger
        .open(NewIncident {
            title: "DB down".to_string(),
            description: "database errors".to_string(),
            severity: Some(Severity::Critical),
            affected_services: vec![api],
        })
        .unwrap();
    assert_eq!(engine.aggregate.compute().unwrap(), ServiceStatus::Outage);

    engine
        .ledger
        .update(
            incident.id,
            IncidentPatch {
                severity: Some(Severity::Minor),
                affected_services: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(
        engine.aggregate.compute().unwrap(),
        ServiceStatus::Operational
    );

    engine
        .ledger
        .update(
            incident.id,
            IncidentPatch {
                affected_services: Some(vec![api]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(engine.aggregate.compute().unwrap(), ServiceStatus::Degraded);

    engine
        .ledger
        .update(
            incident.id,
            IncidentPatch {
                status: Some(IncidentStatus::Resolved),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(
        engine.aggregate.compute().unwrap(),
        ServiceStatus::Operational
    );
}
