//! Service Records
//!
//! A service is a monitored unit of the system with a health status. Its
//! `status` field is written only by cascade side effects, except for the
//! explicit administrative override through `ServiceRegistry::update`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health status of a single service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Service is healthy
    Operational,
    /// Service is impaired but responding
    Degraded,
    /// Service is down
    Outage,
}

impl ServiceStatus {
    /// Returns the lowercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "operational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Outage => "outage",
        }
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        ServiceStatus::Operational
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Service record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique service identifier
    pub id: Uuid,

    /// Display name (unique)
    pub name: String,

    /// Current health status
    pub status: ServiceStatus,

    /// Opaque uptime percentage string, e.g. "99.95%"
    pub uptime: String,

    /// When the service was created
    pub created_at: DateTime<Utc>,

    /// When the service was last written
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Create a new service record stamped at `now`
    pub fn new(name: String, status: ServiceStatus, uptime: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            status,
            uptime,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reduce to the summary embedded in incident read responses
    pub fn summary(&self) -> ServiceSummary {
        ServiceSummary {
            id: self.id,
            name: self.name.clone(),
            status: self.status,
        }
    }
}

/// Service creation request
#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub name: String,
    #[serde(default)]
    pub status: Option<ServiceStatus>,
    #[serde(default)]
    pub uptime: Option<String>,
}

/// Partial service update; only present fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ServiceStatus>,
    #[serde(default)]
    pub uptime: Option<String>,
}

impl ServicePatch {
    /// Whether the patch carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && self.uptime.is_none()
    }
}

/// `{id, name, status}` projection returned by incident read endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub status: ServiceStatus,
}
