//! Go/no-go verdict from independent, named checks.
//!
//! The verdict is blocked iff any check blocks; reasons keep check
//! declaration order. A check that cannot read its sensor reports
//! `Degraded` and fails open: it never blocks.

use async_trait::async_trait;
use tracing::{debug, warn};

/// Result of one safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Safe to move.
    Ok,
    /// Not safe; reason for the caregiver.
    Blocked(String),
    /// Sensor unavailable; treated as ok.
    Degraded(String),
}

/// One pre-movement check.
#[async_trait]
pub trait SafetyCheck: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Evaluate the check now. Never cached.
    async fn evaluate(&self) -> CheckOutcome;
}

/// Aggregated gate verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    /// Movement allowed. `degraded` lists checks that failed open.
    Permitted {
        /// Fail-open notes, declaration order.
        degraded: Vec<String>,
    },
    /// Movement refused.
    Blocked {
        /// Blocking reasons, declaration order.
        reasons: Vec<String>,
    },
}

impl SafetyVerdict {
    /// Whether movement is allowed.
    #[inline]
    pub fn is_permitted(&self) -> bool {
        matches!(self, SafetyVerdict::Permitted { .. })
    }
}

/// Ordered set of safety checks.
#[derive(Default)]
pub struct SafetyGate {
    checks: Vec<Box<dyn SafetyCheck>>,
}

impl SafetyGate {
    /// Start building a gate.
    pub fn builder() -> SafetyGateBuilder {
        SafetyGateBuilder::default()
    }

    /// Number of checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// No checks; such a gate always permits.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Check names in evaluation order.
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run every check in order and aggregate.
    ///
    /// All checks run even after one blocks, so the caregiver sees every reason.
    pub async fn evaluate(&self) -> SafetyVerdict {
        let mut reasons = Vec::new();
        let mut degraded = Vec::new();

        for check in &self.checks {
            match check.evaluate().await {
                CheckOutcome::Ok => debug!("safety check {}: ok", check.name()),
                CheckOutcome::Blocked(reason) => {
                    warn!("Safety check {} blocked: {}", check.name(), reason);
                    reasons.push(reason);
                }
                CheckOutcome::Degraded(note) => {
                    warn!("Safety check {} failed open: {}", check.name(), note);
                    degraded.push(note);
                }
            }
        }

        if reasons.is_empty() {
            SafetyVerdict::Permitted { degraded }
        } else {
            SafetyVerdict::Blocked { reasons }
        }
    }
}

/// Builder for [`SafetyGate`].
#[derive(Default)]
pub struct SafetyGateBuilder {
    checks: Vec<Box<dyn SafetyCheck>>,
}

impl SafetyGateBuilder {
    /// Append a check; evaluation follows insertion order.
    pub fn check(mut self, check: impl SafetyCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Append an already boxed check.
    pub fn boxed(mut self, check: Box<dyn SafetyCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Finish.
    pub fn build(self) -> SafetyGate {
        SafetyGate {
            checks: self.checks,
        }
    }
}
