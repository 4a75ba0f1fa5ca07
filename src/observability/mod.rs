//! Observability subsystem
//!
//! Structured logging, typed lifecycle events and counter metrics for the
//! status API.
//!
//! # Principles
//!
//! 1. Observability is read-only: no side effects on the engine
//! 2. One log line = one event
//! 3. Deterministic output (sorted fields, exact counters)
//! 4. A logging failure must never fail the operation being logged

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{LogLevel, Logger};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with no extra fields
pub fn log_event(event: Event) {
    Logger::info(event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::info(event.as_str(), fields);
}
