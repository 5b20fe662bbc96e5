//! Sensor contracts consumed by the safety gate.
//!
//! Reads are synchronous (a bus transaction); the gate runs them on a
//! blocking thread under a timeout.

use thiserror::Error;

/// Error types for sensor reads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// Bus or device error
    #[error("Sensor read failed: {0}")]
    Read(String),

    /// Read did not complete in time
    #[error("Sensor read timed out after {0} ms")]
    Timeout(u64),

    /// An earlier read has not returned yet; no new read was issued
    #[error("Previous sensor read still outstanding")]
    Stalled,
}

/// Bed pressure sensor (ADC behind I2C on the reference hardware).
pub trait PressureSensor: Send + Sync {
    /// Raw pressure reading.
    fn read_pressure(&self) -> Result<f64, SensorError>;
}

/// Obstruction detector (ultrasonic or camera based).
pub trait ObstructionDetector: Send + Sync {
    /// `Ok(Some(reason))` when something blocks the mechanism.
    fn detect(&self) -> Result<Option<String>, SensorError>;
}
