//! Built-in safety checks.
//!
//! - `PresenceCheck` - bed pressure above threshold, bounded read latency
//! - `ObstructionCheck` - nothing blocking the mechanism
//! - `ActuatorHealthCheck` - output backend reports no fault

use super::gate::{CheckOutcome, SafetyCheck, SafetyGate};
use async_trait::async_trait;
use carebot_common::config::SafetyConfig;
use carebot_common::sensor::{ObstructionDetector, PressureSensor, SensorError};
use carebot_hal::ActuatorDriver;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Reason reported when the bed is empty.
pub const PATIENT_NOT_DETECTED: &str = "환자 미감지: 침대 위 환자 없음 (patient not detected)";

/// Patient presence from the bed pressure sensor.
///
/// The read is a blocking bus transaction; it runs on the blocking pool
/// under a timeout. Read error, timeout or a panicked read fail open.
///
/// A timed-out read cannot be cancelled and keeps its blocking thread. At
/// most one read is in flight: while it is, later evaluations fail open
/// with `SensorError::Stalled` instead of issuing another read, so a hung
/// sensor holds one thread rather than one per cycle.
pub struct PresenceCheck {
    sensor: Arc<dyn PressureSensor>,
    min_pressure: f64,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the blocking read returns or panics.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PresenceCheck {
    /// Create the check.
    pub fn new(sensor: Arc<dyn PressureSensor>, min_pressure: f64, timeout: Duration) -> Self {
        Self {
            sensor,
            min_pressure,
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    async fn read(&self) -> Result<f64, SensorError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SensorError::Stalled);
        }
        let guard = InFlight(Arc::clone(&self.in_flight));
        let sensor = Arc::clone(&self.sensor);
        let read = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            sensor.read_pressure()
        });
        match tokio::time::timeout(self.timeout, read).await {
            Ok(Ok(reading)) => reading,
            Ok(Err(join)) => Err(SensorError::Read(join.to_string())),
            Err(_) => Err(SensorError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl SafetyCheck for PresenceCheck {
    fn name(&self) -> &'static str {
        "presence"
    }

    async fn evaluate(&self) -> CheckOutcome {
        match self.read().await {
            Ok(pressure) if pressure < self.min_pressure => {
                CheckOutcome::Blocked(PATIENT_NOT_DETECTED.to_string())
            }
            Ok(_) => CheckOutcome::Ok,
            Err(e) => CheckOutcome::Degraded(format!("압력 센서 읽기 실패 (pressure sensor): {e}")),
        }
    }
}

/// Obstruction around the mechanism.
pub struct ObstructionCheck {
    detector: Option<Arc<dyn ObstructionDetector>>,
}

impl ObstructionCheck {
    /// Check backed by a detector.
    pub fn new(detector: Arc<dyn ObstructionDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// No detector fitted; always ok.
    pub fn unfitted() -> Self {
        Self { detector: None }
    }
}

#[async_trait]
impl SafetyCheck for ObstructionCheck {
    fn name(&self) -> &'static str {
        "obstruction"
    }

    async fn evaluate(&self) -> CheckOutcome {
        let Some(detector) = &self.detector else {
            return CheckOutcome::Ok;
        };
        match detector.detect() {
            Ok(None) => CheckOutcome::Ok,
            Ok(Some(what)) => CheckOutcome::Blocked(format!("장애물 감지 (obstruction): {what}")),
            Err(e) => CheckOutcome::Degraded(format!("장애물 센서 읽기 실패 (obstruction sensor): {e}")),
        }
    }
}

/// Output backend health.
pub struct ActuatorHealthCheck {
    driver: Arc<ActuatorDriver>,
}

impl ActuatorHealthCheck {
    /// Check the given driver.
    pub fn new(driver: Arc<ActuatorDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl SafetyCheck for ActuatorHealthCheck {
    fn name(&self) -> &'static str {
        "actuator_health"
    }

    async fn evaluate(&self) -> CheckOutcome {
        if self.driver.is_released() {
            return CheckOutcome::Blocked("액추에이터 비활성 (actuator outputs released)".to_string());
        }
        match self.driver.health() {
            None => CheckOutcome::Ok,
            Some(fault) => CheckOutcome::Blocked(format!("액추에이터 이상 (actuator fault): {fault}")),
        }
    }
}

impl SafetyGate {
    /// Presence, obstruction and actuator health, in that order.
    pub fn standard(
        config: &SafetyConfig,
        sensor: Arc<dyn PressureSensor>,
        detector: Option<Arc<dyn ObstructionDetector>>,
        driver: Arc<ActuatorDriver>,
    ) -> Self {
        let obstruction = match detector {
            Some(detector) => ObstructionCheck::new(detector),
            None => ObstructionCheck::unfitted(),
        };
        SafetyGate::builder()
            .check(PresenceCheck::new(sensor, config.min_pressure, config.sensor_timeout()))
            .check(obstruction)
            .check(ActuatorHealthCheck::new(driver))
            .build()
    }
}
