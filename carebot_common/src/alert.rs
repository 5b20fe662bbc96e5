//! Alert events and the consumer contract.
//!
//! The core emits `AlertEvent`s fire-and-forget into an `AlertSink`.
//! Delivery (log, dashboard, SMS) is entirely the sink's business; a
//! sink must not block and must swallow its own delivery failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine progress (rotation completed).
    Info,
    /// Something was skipped or degraded.
    Warning,
    /// Actuator fault or emergency stop.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        })
    }
}

/// Transient alert raised by the core. Not persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Severity.
    pub severity: Severity,
    /// Caregiver-facing text.
    pub message: String,
    /// A caregiver must check on the patient.
    pub requires_manual: bool,
    /// When the core raised the alert.
    pub raised_at: DateTime<Utc>,
}

impl AlertEvent {
    /// Build an alert stamped with the current time.
    pub fn new(severity: Severity, message: impl Into<String>, requires_manual: bool) -> Self {
        Self {
            severity,
            message: message.into(),
            requires_manual,
            raised_at: Utc::now(),
        }
    }

    /// Informational alert, no manual action.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message, false)
    }

    /// Warning alert.
    pub fn warning(message: impl Into<String>, requires_manual: bool) -> Self {
        Self::new(Severity::Warning, message, requires_manual)
    }

    /// Critical alert, always requires manual action.
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message, true)
    }
}

/// Consumer of alert events.
///
/// `notify` is called from the scheduler and from the emergency-stop path,
/// possibly concurrently. It must be cheap or queue internally.
pub trait AlertSink: Send + Sync {
    /// Deliver one event. Never fails from the caller's point of view.
    fn notify(&self, event: AlertEvent);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AlertSink for NullSink {
    fn notify(&self, _event: AlertEvent) {}
}
