//! Output backend trait and error types.
//!
//! This module defines:
//! - `ActuatorOutput` trait - Interface for pluggable output backends
//! - `OutputError` enum - Error types for output operations
//! - `OutputFactory` type alias - Factory function type

use crate::hal::types::DriveCommand;
use crate::posture::Channel;
use thiserror::Error;

/// Error types for output operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// Backend initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    Communication(String),

    /// Outputs were disabled by a release
    #[error("Outputs are disabled")]
    Disabled,

    /// No backend registered under this name
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// A backend with this name is already registered
    #[error("Driver already registered: {0}")]
    DuplicateDriver(String),
}

/// Factory function type for creating backend instances.
pub type OutputFactory = fn() -> Box<dyn ActuatorOutput>;

/// Trait defining the interface for actuator output backends.
///
/// The actuator driver owns exactly one backend and calls it only while
/// holding its channel-state lock, so implementations need not be `Sync`.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the first command
/// 2. `apply()` - Called per channel for every interpolation tick
/// 3. `halt()` - Called on emergency halt, any time
/// 4. `disable()` - Called once on release
///
/// # Timing Contracts
///
/// | Operation   | Blocking allowed | Notes                          |
/// |-------------|------------------|--------------------------------|
/// | `init()`    | yes              | pin setup, bus probing         |
/// | `apply()`   | no               | pin writes only                |
/// | `halt()`    | no               | must never fail                |
/// | `disable()` | yes              | releases the hardware          |
pub trait ActuatorOutput: Send {
    /// Returns the backend's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Prepare the hardware: direction pins as outputs, PWM started at 0%.
    ///
    /// # Errors
    /// Return `OutputError::InitFailed` if the hardware cannot be set up.
    fn init(&mut self) -> Result<(), OutputError>;

    /// Drive one channel: direction pins plus PWM duty cycle.
    fn apply(&mut self, channel: Channel, command: DriveCommand) -> Result<(), OutputError>;

    /// All direction pins low, all duty cycles zero. Infallible.
    fn halt(&mut self);

    /// Stop PWM generation and release the pins.
    fn disable(&mut self) -> Result<(), OutputError>;

    /// Backend-detected fault (overcurrent, driver error), if any.
    /// Default: None
    fn fault(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullOutput {
        applied: usize,
    }

    impl ActuatorOutput for NullOutput {
        fn name(&self) -> &'static str {
            "null"
        }

        fn init(&mut self) -> Result<(), OutputError> {
            Ok(())
        }

        fn apply(&mut self, _channel: Channel, _command: DriveCommand) -> Result<(), OutputError> {
            self.applied += 1;
            Ok(())
        }

        fn halt(&mut self) {}

        fn disable(&mut self) -> Result<(), OutputError> {
            Ok(())
        }
    }

    #[test]
    fn test_output_error_display() {
        let err = OutputError::Communication("i2c nack".to_string());
        assert!(err.to_string().contains("i2c nack"));
        assert_eq!(OutputError::Disabled.to_string(), "Outputs are disabled");
    }

    #[test]
    fn test_default_fault_is_none() {
        let mut out = NullOutput { applied: 0 };
        out.apply(Channel::HeadLeft, DriveCommand::NEUTRAL).unwrap();
        assert_eq!(out.applied, 1);
        assert!(out.fault().is_none());
    }
}
