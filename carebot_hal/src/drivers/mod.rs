//! Output backend implementations.
//!
//! - [`simulation`] - Software backend and simulated sensors for development
//!   and testing without the actuator hardware
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `ActuatorOutput` from `carebot_common::hal::output`
//! 3. Register the factory in `DriverRegistry::with_builtin()`, or at startup
//!    with `DriverRegistry::register`

pub mod simulation;
