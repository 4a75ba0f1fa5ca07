//! Incident Records
//!
//! An incident is a reported event with a lifecycle and an append-only
//! narrative log, affecting zero or more services by reference. The log is
//! seeded with exactly one entry at creation and never shrinks or reorders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service::ServiceStatus;

/// Lifecycle status of an incident
///
/// All transitions are permitted; the narrative log records the order events
/// actually happened in. Only entering `Resolved` carries side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
}

impl IncidentStatus {
    /// Returns the lowercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Identified => "identified",
            IncidentStatus::Monitoring => "monitoring",
            IncidentStatus::Resolved => "resolved",
        }
    }

    /// Parse the wire representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "investigating" => Some(IncidentStatus::Investigating),
            "identified" => Some(IncidentStatus::Identified),
            "monitoring" => Some(IncidentStatus::Monitoring),
            "resolved" => Some(IncidentStatus::Resolved),
            _ => None,
        }
    }
}

impl Default for IncidentStatus {
    fn default() -> Self {
        IncidentStatus::Investigating
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Incident-intrinsic urgency; drives escalation strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    /// Returns the lowercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }

    /// The service status an escalation at this severity writes
    pub fn escalates_to(&self) -> ServiceStatus {
        match self {
            Severity::Critical => ServiceStatus::Outage,
            Severity::Minor | Severity::Major => ServiceStatus::Degraded,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Minor
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in an incident's narrative log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentUpdate {
    /// Narrative message
    pub message: String,

    /// Incident status at the time the entry was appended
    pub status: IncidentStatus,

    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}

/// Incident record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Unique incident identifier
    pub id: Uuid,

    /// Short headline
    pub title: String,

    /// Full description
    pub description: String,

    /// Lifecycle status
    pub status: IncidentStatus,

    /// Urgency
    pub severity: Severity,

    /// Ids of services this incident affects (deduplicated)
    pub affected_services: Vec<Uuid>,

    /// Append-only narrative log, oldest first
    pub updates: Vec<IncidentUpdate>,

    /// When the incident was opened
    pub created_at: DateTime<Utc>,

    /// When the incident was last written
    pub updated_at: DateTime<Utc>,

    /// Present iff `status == Resolved`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Incident {
    /// Open a new incident stamped at `now`
    ///
    /// The narrative log is seeded with the single reporting entry.
    pub fn open(
        title: String,
        description: String,
        severity: Severity,
        affected_services: Vec<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        let report = IncidentUpdate {
            message: format!("Incident reported: {}", description),
            status: IncidentStatus::Investigating,
            created_at: now,
        };

        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status: IncidentStatus::Investigating,
            severity,
            affected_services,
            updates: vec![report],
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    /// Whether the incident is in a terminal state
    pub fn is_resolved(&self) -> bool {
        self.status == IncidentStatus::Resolved
    }

    /// Append a narrative entry; the log never shrinks or reorders
    pub fn append_update(&mut self, message: String, now: DateTime<Utc>) {
        self.updates.push(IncidentUpdate {
            message,
            status: self.status,
            created_at: now,
        });
    }
}

/// Incident creation request
#[derive(Debug, Clone, Deserialize)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub affected_services: Vec<Uuid>,
}

/// Partial incident update; only present fields are applied
///
/// `update_message`, when present, appends exactly one narrative entry
/// regardless of which other fields are carried.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<IncidentStatus>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub affected_services: Option<Vec<Uuid>>,
    #[serde(default)]
    pub update_message: Option<String>,
}

/// Read filter for incident listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentFilter {
    /// Everything whose status is not `Resolved` (the default)
    Active,
    /// Exactly one status value
    Status(IncidentStatus),
}

impl Default for IncidentFilter {
    fn default() -> Self {
        IncidentFilter::Active
    }
}

impl IncidentFilter {
    /// Whether an incident passes this filter
    pub fn matches(&self, incident: &Incident) -> bool {
        match self {
            IncidentFilter::Active => incident.status != IncidentStatus::Resolved,
            IncidentFilter::Status(status) => incident.status == *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_seeds_exactly_one_log_entry() {
        let now = Utc::now();
        let incident = Incident::open(
            "DB down".to_string(),
            "database errors".to_string(),
            Severity::Critical,
            vec![],
            now,
        );

        assert_eq!(incident.status, IncidentStatus::Investigating);
        assert_eq!(incident.updates.len(), 1);
        assert_eq!(incident.updates[0].message, "Incident reported: database errors");
        assert_eq!(incident.updates[0].status, IncidentStatus::Investigating);
        assert!(incident.resolved_at.is_none());
    }

    #[test]
    fn test_escalation_targets() {
        assert_eq!(Severity::Critical.escalates_to(), ServiceStatus::Outage);
        assert_eq!(Severity::Major.escalates_to(), ServiceStatus::Degraded);
        assert_eq!(Severity::Minor.escalates_to(), ServiceStatus::Degraded);
    }

    #[test]
    fn test_append_update_snapshots_current_status() {
        let now = Utc::now();
        let mut incident = Incident::open(
            "t".to_string(),
            "d".to_string(),
            Severity::Minor,
            vec![],
            now,
        );
        incident.status = IncidentStatus::Monitoring;
        incident.append_update("watching dashboards".to_string(), now);

        assert_eq!(incident.updates.len(), 2);
        assert_eq!(incident.updates[1].status, IncidentStatus::Monitoring);
    }

    #[test]
    fn test_filter_default_hides_resolved() {
        let now = Utc::now();
        let mut incident = Incident::open(
            "t".to_string(),
            "d".to_string(),
            Severity::Minor,
            vec![],
            now,
        );
        assert!(IncidentFilter::default().matches(&incident));

        incident.status = IncidentStatus::Resolved;
        assert!(!IncidentFilter::default().matches(&incident));
        assert!(IncidentFilter::Status(IncidentStatus::Resolved).matches(&incident));
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            IncidentStatus::Investigating,
            IncidentStatus::Identified,
            IncidentStatus::Monitoring,
            IncidentStatus::Resolved,
        ] {
            assert_eq!(IncidentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(IncidentStatus::parse("escalated"), None);
    }
}
