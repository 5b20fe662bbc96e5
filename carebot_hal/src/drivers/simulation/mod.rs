//! Simulation backend.
//!
//! Stands in for the H-bridge drivers and the bed sensors when no hardware
//! is attached. Failures can be injected to exercise the fault paths.

mod output;
mod sensor;

pub use output::{FaultSwitch, SimulationOutput};
pub use sensor::{NoObstruction, SimulatedPressure};

use carebot_common::hal::output::ActuatorOutput;

/// Factory function for driver registration.
pub fn create_driver() -> Box<dyn ActuatorOutput> {
    Box::new(SimulationOutput::new())
}
