//! Rotation cycle errors and outcomes.
//!
//! Cycle errors never escape the timer loop. They become alerts and a
//! `CycleOutcome`; manual callers get the `CycleError` back as well.

use carebot_common::posture::Posture;
use carebot_hal::MotionError;
use thiserror::Error;

/// Why a rotation did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// The safety gate refused the move.
    #[error("Safety check failed: {}", .reasons.join(" | "))]
    Blocked {
        /// Blocking reasons, check order.
        reasons: Vec<String>,
    },

    /// The driver refused or aborted the move.
    #[error(transparent)]
    Motion(#[from] MotionError),
}

/// Result of one rotation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Moved to this posture.
    Rotated(Posture),
    /// Safety gate refused; reasons in check order.
    Blocked(Vec<String>),
    /// Another move owned the actuators; skipped without halting.
    Busy,
    /// Move failed or was halted; driver halted, critical alert raised.
    Failed(String),
}

impl From<Result<Posture, CycleError>> for CycleOutcome {
    fn from(result: Result<Posture, CycleError>) -> Self {
        match result {
            Ok(posture) => CycleOutcome::Rotated(posture),
            Err(CycleError::Blocked { reasons }) => CycleOutcome::Blocked(reasons),
            Err(CycleError::Motion(MotionError::Busy)) => CycleOutcome::Busy,
            Err(CycleError::Motion(e)) => CycleOutcome::Failed(e.to_string()),
        }
    }
}
