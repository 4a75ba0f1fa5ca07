//! Status Propagator
//!
//! Applies the service-status side effects of incident lifecycle changes.
//!
//! Cascades are two-phase: the ledger computes a full [`CascadePlan`] (which
//! services to reset, which to escalate, and to what) before a single status
//! write happens, then [`StatusPropagator::apply`] writes the whole plan in
//! batch passes.
//!
//! Escalate and reset overwrite unconditionally. They do not consult other
//! incidents that may also cover the same service, so concurrent cascades on
//! a shared service are last-write-wins. That makes `Service.status` an
//! eventually-consistent projection of incident activity, not a linearizable
//! one.

use std::sync::Arc;

use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::store::ServiceStore;

use super::clock::Clock;
use super::error::CoreResult;
use super::incident::Severity;
use super::service::ServiceStatus;

/// The full effect set of one incident lifecycle change
///
/// Computed before any write. Resets are applied before escalations, so an id
/// present in both ends at its escalation target.
#[derive(Debug, Clone, Default)]
pub struct CascadePlan {
    reset: Vec<Uuid>,
    escalate: Vec<(Uuid, ServiceStatus)>,
}

impl CascadePlan {
    /// Plan to set every id back to operational
    pub fn reset(ids: &[Uuid]) -> Self {
        Self {
            reset: ids.to_vec(),
            escalate: Vec::new(),
        }
    }

    /// Plan to escalate every id at the given severity
    pub fn escalate(ids: &[Uuid], severity: Severity) -> Self {
        let target = severity.escalates_to();
        Self {
            reset: Vec::new(),
            escalate: ids.iter().map(|id| (*id, target)).collect(),
        }
    }

    /// Combine two plans into one logical unit
    pub fn merge(mut self, other: CascadePlan) -> Self {
        self.reset.extend(other.reset);
        self.escalate.extend(other.escalate);
        self
    }

    /// Whether the plan carries no writes
    pub fn is_empty(&self) -> bool {
        self.reset.is_empty() && self.escalate.is_empty()
    }

    /// Ids planned for reset
    pub fn reset_ids(&self) -> &[Uuid] {
        &self.reset
    }

    /// Ids planned for escalation with their target status
    pub fn escalations(&self) -> &[(Uuid, ServiceStatus)] {
        &self.escalate
    }
}

/// Applies cascade plans against the service store
pub struct StatusPropagator<S: ServiceStore> {
    services: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ServiceStore> StatusPropagator<S> {
    pub fn new(services: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { services, clock }
    }

    /// Apply a plan: resets first, then escalations, as batch writes
    ///
    /// Every touched record gets `updated_at` stamped from the injected clock.
    pub fn apply(&self, plan: &CascadePlan) -> CoreResult<()> {
        if plan.is_empty() {
            return Ok(());
        }

        let at = self.clock.now();

        if !plan.reset.is_empty() {
            let mut ids = plan.reset.clone();
            ids.sort();
            ids.dedup();
            self.services
                .set_status_many(&ids, ServiceStatus::Operational, at)?;
            log_event_with_fields(
                Event::CascadeReset,
                &[("services", &ids.len().to_string())],
            );
        }

        for target in [ServiceStatus::Degraded, ServiceStatus::Outage] {
            let mut ids: Vec<Uuid> = plan
                .escalate
                .iter()
                .filter(|(_, t)| *t == target)
                .map(|(id, _)| *id)
                .collect();
            if ids.is_empty() {
                continue;
            }
            ids.sort();
            ids.dedup();
            self.services.set_status_many(&ids, target, at)?;
            log_event_with_fields(
                Event::CascadeEscalate,
                &[
                    ("services", &ids.len().to_string()),
                    ("target", target.as_str()),
                ],
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::service::Service;
    use crate::store::InMemoryServiceStore;
    use chrono::{Duration, TimeZone, Utc};

    fn fixture() -> (Arc<InMemoryServiceStore>, Arc<ManualClock>, Vec<Uuid>) {
        let store = Arc::new(InMemoryServiceStore::new());
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        let mut ids = Vec::new();
        for name in ["api", "cdn", "db"] {
            let service = Service::new(
                name.to_string(),
                ServiceStatus::Operational,
                "100%".to_string(),
                clock.now(),
            );
            ids.push(service.id);
            store.insert(&service).unwrap();
        }
        (store, clock, ids)
    }

    #[test]
    fn test_critical_escalation_writes_outage() {
        let (store, clock, ids) = fixture();
        let propagator = StatusPropagator::new(store.clone(), clock.clone());

        let plan = CascadePlan::escalate(&ids, Severity::Critical);
        propagator.apply(&plan).unwrap();

        for id in &ids {
            assert_eq!(
                store.fetch(*id).unwrap().unwrap().status,
                ServiceStatus::Outage
            );
        }
    }

    #[test]
    fn test_minor_and_major_escalate_to_degraded() {
        let (store, clock, ids) = fixture();
        let propagator = StatusPropagator::new(store.clone(), clock);

        for severity in [Severity::Minor, Severity::Major] {
            propagator
                .apply(&CascadePlan::escalate(&ids[..1], severity))
                .unwrap();
            assert_eq!(
                store.fetch(ids[0]).unwrap().unwrap().status,
                ServiceStatus::Degraded
            );
        }
    }

    #[test]
    fn test_escalation_wins_over_reset_in_one_plan() {
        let (store, clock, ids) = fixture();
        let propagator = StatusPropagator::new(store.clone(), clock);

        let plan = CascadePlan::reset(&ids[..1])
            .merge(CascadePlan::escalate(&ids[..1], Severity::Critical));
        propagator.apply(&plan).unwrap();

        assert_eq!(
            store.fetch(ids[0]).unwrap().unwrap().status,
            ServiceStatus::Outage
        );
    }

    #[test]
    fn test_apply_stamps_updated_at_from_clock() {
        let (store, clock, ids) = fixture();
        let propagator = StatusPropagator::new(store.clone(), clock.clone());

        clock.advance(Duration::minutes(10));
        propagator
            .apply(&CascadePlan::escalate(&ids[..1], Severity::Minor))
            .unwrap();

        let got = store.fetch(ids[0]).unwrap().unwrap();
        assert_eq!(got.updated_at, clock.now());
    }

    #[test]
    fn test_empty_plan_is_a_no_op() {
        let (store, clock, ids) = fixture();
        let before = store.fetch(ids[0]).unwrap().unwrap();
        let propagator = StatusPropagator::new(store.clone(), clock);

        propagator.apply(&CascadePlan::default()).unwrap();

        let after = store.fetch(ids[0]).unwrap().unwrap();
        assert_eq!(before.updated_at, after.updated_at);
    }
}
