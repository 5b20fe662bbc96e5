//! # CareBot HAL Library
//!
//! Actuator driver with pluggable output backends.
//!
//! The driver owns the per-channel state of the four linear actuators and
//! the hardware backend behind them. Backends implement the
//! `ActuatorOutput` trait defined in `carebot_common::hal::output`.
//!
//! # Module Structure
//!
//! - [`actuator`] - `ActuatorDriver`: stepped moves, emergency halt, release
//! - [`driver_registry`] - Backend factory registration
//! - [`drivers`] - Backend implementations (simulation)
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         carebot_hal                            │
//! │  ┌──────────────┐    ┌──────────────────┐    ┌─────────────┐   │
//! │  │ move_to()    │───►│  ActuatorDriver  │◄───│ emergency_  │   │
//! │  │ (one owner)  │    │  ChannelState    │    │ halt()      │   │
//! │  └──────────────┘    └────────┬─────────┘    └─────────────┘   │
//! │                               │                                │
//! │                               ▼                                │
//! │                      ┌────────────────┐                        │
//! │                      │ ActuatorOutput │ (trait object)         │
//! │                      └────────────────┘                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod actuator;
pub mod driver_registry;
pub mod drivers;

// Re-export key types for convenience
pub use crate::actuator::{ActuatorDriver, MotionError, ReleaseGuard};
pub use crate::driver_registry::DriverRegistry;
