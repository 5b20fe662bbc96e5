//! # CareBot Control Library
//!
//! Everything that decides *when* and *whether* the actuators move.
//!
//! # Module Structure
//!
//! - [`safety`] - Safety gate, built-in checks, emergency stop input
//! - [`state`] - Scheduler state machine (Stopped → Running ⇄ Paused)
//! - [`scheduler`] - `RotationScheduler`: timer loop, cycles, manual override
//! - [`error`] - Rotation cycle errors and outcomes
//!
//! # Control Flow
//!
//! ```text
//!   timer tick ──► SafetyGate::evaluate() ──► ActuatorDriver::move_to() ──► AlertSink
//!                        │ blocked                    │ fault / halted
//!                        ▼                            ▼
//!                  warning alert          emergency_halt() + critical alert
//!
//!   estop edge ──► EmergencyStop::trigger() ──► ActuatorDriver::emergency_halt()
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod safety;
pub mod scheduler;
pub mod state;

pub use crate::error::{CycleError, CycleOutcome};
pub use crate::safety::estop::EmergencyStop;
pub use crate::safety::gate::{CheckOutcome, SafetyCheck, SafetyGate, SafetyVerdict};
pub use crate::scheduler::{RotationScheduler, SchedulerSnapshot, SchedulerTiming};
pub use crate::state::machine::{SchedulerState, SchedulerStateMachine};
