//! Simulated bed sensors.

use carebot_common::sensor::{ObstructionDetector, PressureSensor, SensorError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct PressureState {
    reading: Result<f64, SensorError>,
    latency: Duration,
}

/// Pressure sensor with a settable reading.
///
/// Clones share the same state, so a test or the dashboard can keep a
/// handle while the safety gate owns another.
#[derive(Debug, Clone)]
pub struct SimulatedPressure {
    state: Arc<Mutex<PressureState>>,
}

impl SimulatedPressure {
    /// Sensor that reports `value`.
    pub fn new(value: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(PressureState {
                reading: Ok(value),
                latency: Duration::ZERO,
            })),
        }
    }

    /// Report `value` from now on.
    pub fn set(&self, value: f64) {
        self.state.lock().reading = Ok(value);
    }

    /// Fail every read with `message`.
    pub fn fail(&self, message: impl Into<String>) {
        self.state.lock().reading = Err(SensorError::Read(message.into()));
    }

    /// Block each read for `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }
}

impl PressureSensor for SimulatedPressure {
    fn read_pressure(&self) -> Result<f64, SensorError> {
        let (reading, latency) = {
            let state = self.state.lock();
            (state.reading.clone(), state.latency)
        };
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        reading
    }
}

/// Obstruction detector that never sees anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstruction;

impl ObstructionDetector for NoObstruction {
    fn detect(&self) -> Result<Option<String>, SensorError> {
        Ok(None)
    }
}
