//! Simulated actuator outputs.
//!
//! The `SimulationOutput` implements the `ActuatorOutput` trait by
//! recording the last command per channel instead of toggling pins.

use carebot_common::consts::CHANNEL_COUNT;
use carebot_common::hal::output::{ActuatorOutput, OutputError};
use carebot_common::hal::types::DriveCommand;
use carebot_common::posture::Channel;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, trace};

/// Shared switch that makes a `SimulationOutput` fail.
///
/// Clone it before boxing the backend to keep a handle for tests.
#[derive(Debug, Clone, Default)]
pub struct FaultSwitch {
    fault: Arc<Mutex<Option<String>>>,
}

impl FaultSwitch {
    /// Switch with no fault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `apply` fail with `message`.
    pub fn trip(&self, message: impl Into<String>) {
        *self.fault.lock() = Some(message.into());
    }

    /// Clear the fault.
    pub fn clear(&self) {
        *self.fault.lock() = None;
    }

    /// Current fault message.
    pub fn message(&self) -> Option<String> {
        self.fault.lock().clone()
    }
}

/// Software output backend.
pub struct SimulationOutput {
    /// Driver name
    name: &'static str,
    /// Initialized flag
    initialized: bool,
    /// Cleared by `disable`
    enabled: bool,
    /// Last command per channel
    commands: [DriveCommand; CHANNEL_COUNT],
    /// Number of successful `apply` calls
    applied: u64,
    /// Injected fault
    faults: FaultSwitch,
}

impl SimulationOutput {
    /// Create a new simulation backend.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            initialized: false,
            enabled: false,
            commands: [DriveCommand::NEUTRAL; CHANNEL_COUNT],
            applied: 0,
            faults: FaultSwitch::new(),
        }
    }

    /// Use an external fault switch.
    pub fn with_fault_switch(mut self, faults: FaultSwitch) -> Self {
        self.faults = faults;
        self
    }

    /// Last command sent to a channel.
    pub fn command(&self, channel: Channel) -> DriveCommand {
        self.commands[channel.index()]
    }

    /// Number of successful channel writes.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

impl Default for SimulationOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorOutput for SimulationOutput {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self) -> Result<(), OutputError> {
        self.initialized = true;
        self.enabled = true;
        self.commands = [DriveCommand::NEUTRAL; CHANNEL_COUNT];
        info!("🔧 Simulation outputs initialized ({} channels)", CHANNEL_COUNT);
        Ok(())
    }

    fn apply(&mut self, channel: Channel, command: DriveCommand) -> Result<(), OutputError> {
        if !self.enabled {
            return Err(OutputError::Disabled);
        }
        if let Some(message) = self.faults.message() {
            return Err(OutputError::Communication(message));
        }

        trace!(
            "sim {}: {:?} at {:.1}%",
            channel, command.direction, command.intensity
        );
        self.commands[channel.index()] = command;
        self.applied += 1;
        Ok(())
    }

    fn halt(&mut self) {
        self.commands = [DriveCommand::NEUTRAL; CHANNEL_COUNT];
    }

    fn disable(&mut self) -> Result<(), OutputError> {
        self.halt();
        self.enabled = false;
        self.initialized = false;
        Ok(())
    }

    fn fault(&self) -> Option<String> {
        self.faults.message()
    }
}
