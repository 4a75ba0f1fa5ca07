//! Metrics registry
//!
//! Counters only, monotonic, reset on process start. Thread-safe increments
//! with relaxed ordering; metrics are a read-only view and never affect the
//! engine.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the status API
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Service records created
    services_created: AtomicU64,
    /// Service records deleted
    services_deleted: AtomicU64,
    /// Incidents opened
    incidents_opened: AtomicU64,
    /// Incidents that entered resolved
    incidents_resolved: AtomicU64,
    /// Incidents deleted
    incidents_deleted: AtomicU64,
    /// Narrative log entries appended
    log_entries_appended: AtomicU64,
    /// Cascade plans applied (non-empty only)
    cascades_applied: AtomicU64,
    /// Mutating requests rejected for missing/invalid credentials
    auth_rejected: AtomicU64,
}

impl MetricsRegistry {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_services_created(&self) {
        self.services_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_services_deleted(&self) {
        self.services_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_incidents_opened(&self) {
        self.incidents_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_incidents_resolved(&self) {
        self.incidents_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_incidents_deleted(&self) {
        self.incidents_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_log_entries(&self) {
        self.log_entries_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cascades(&self) {
        self.cascades_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_auth_rejected(&self) {
        self.auth_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            services_created: self.services_created.load(Ordering::Relaxed),
            services_deleted: self.services_deleted.load(Ordering::Relaxed),
            incidents_opened: self.incidents_opened.load(Ordering::Relaxed),
            incidents_resolved: self.incidents_resolved.load(Ordering::Relaxed),
            incidents_deleted: self.incidents_deleted.load(Ordering::Relaxed),
            log_entries_appended: self.log_entries_appended.load(Ordering::Relaxed),
            cascades_applied: self.cascades_applied.load(Ordering::Relaxed),
            auth_rejected: self.auth_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Serializable counter snapshot for the metrics endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub services_created: u64,
    pub services_deleted: u64,
    pub incidents_opened: u64,
    pub incidents_resolved: u64,
    pub incidents_deleted: u64,
    pub log_entries_appended: u64,
    pub cascades_applied: u64,
    pub auth_rejected: u64,
}
