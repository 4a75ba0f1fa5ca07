//! Lifecycle events
//!
//! Every observable event gets an explicit, typed name. Domain events cover
//! the registry, the ledger and the cascades they trigger; lifecycle events
//! cover boot and shutdown.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & lifecycle
    /// Startup begins
    BootStart,
    /// Startup complete, serving requests
    BootComplete,
    /// Configuration loaded
    ConfigLoaded,
    /// Shutdown initiated
    ShutdownStart,

    // Service registry
    /// Service record created
    ServiceCreated,
    /// Service record updated (manual override path included)
    ServiceUpdated,
    /// Service record deleted
    ServiceDeleted,

    // Incident ledger
    /// Incident opened
    IncidentOpened,
    /// Incident patched
    IncidentUpdated,
    /// Incident entered resolved
    IncidentResolved,
    /// Incident deleted
    IncidentDeleted,

    // Cascades
    /// Services escalated by an incident
    CascadeEscalate,
    /// Services reset to operational
    CascadeReset,

    // Auth
    /// Admin logged in
    AuthLogin,
    /// Credential rejected
    AuthRejected,
}

impl Event {
    /// Returns the event name as logged
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::BootComplete => "BOOT_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ServiceCreated => "SERVICE_CREATED",
            Event::ServiceUpdated => "SERVICE_UPDATED",
            Event::ServiceDeleted => "SERVICE_DELETED",
            Event::IncidentOpened => "INCIDENT_OPENED",
            Event::IncidentUpdated => "INCIDENT_UPDATED",
            Event::IncidentResolved => "INCIDENT_RESOLVED",
            Event::IncidentDeleted => "INCIDENT_DELETED",
            Event::CascadeEscalate => "CASCADE_ESCALATE",
            Event::CascadeReset => "CASCADE_RESET",
            Event::AuthLogin => "AUTH_LOGIN",
            Event::AuthRejected => "AUTH_REJECTED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
