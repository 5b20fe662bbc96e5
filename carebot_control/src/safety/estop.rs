//! Hardware emergency stop input.
//!
//! `trigger()` is what the button's edge callback calls. It runs on the
//! input thread, never awaits, and halts the driver directly, whatever the
//! scheduler is doing. It does not pause the scheduler: the next scheduled
//! cycle still runs unless an operator pauses after seeing the alert.
//!
//! The debounce window is measured on the tokio clock, the same clock as
//! the scheduler; called from a thread outside the runtime it reads the
//! system monotonic clock.

use carebot_common::alert::{AlertEvent, AlertSink};
use carebot_hal::ActuatorDriver;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error};

/// Debounced emergency stop input.
pub struct EmergencyStop {
    driver: Arc<ActuatorDriver>,
    alerts: Arc<dyn AlertSink>,
    debounce: Duration,
    /// Time of the last accepted edge
    last_edge: Mutex<Option<Instant>>,
    /// Accepted edges
    presses: AtomicU64,
}

impl EmergencyStop {
    /// Create the input handler.
    pub fn new(driver: Arc<ActuatorDriver>, alerts: Arc<dyn AlertSink>, debounce: Duration) -> Self {
        Self {
            driver,
            alerts,
            debounce,
            last_edge: Mutex::new(None),
            presses: AtomicU64::new(0),
        }
    }

    /// Handle one edge from the button.
    ///
    /// Returns `true` if the edge was accepted, `false` if it fell inside
    /// the debounce window of the previous accepted edge.
    pub fn trigger(&self) -> bool {
        let now = Instant::now();
        {
            let mut last = self.last_edge.lock();
            if matches!(*last, Some(previous) if now.duration_since(previous) < self.debounce) {
                debug!("Emergency stop edge ignored (debounce)");
                return false;
            }
            *last = Some(now);
        }

        let presses = self.presses.fetch_add(1, Ordering::SeqCst) + 1;
        error!("🚨 EMERGENCY STOP PRESSED (#{}): all actuators halted", presses);
        self.driver.emergency_halt();
        self.alerts.notify(AlertEvent::critical(
            "긴급 정지 버튼 작동: 모든 액추에이터 정지, 즉시 확인 필요 (emergency stop pressed)",
        ));
        true
    }

    /// Accepted presses since start.
    pub fn press_count(&self) -> u64 {
        self.presses.load(Ordering::SeqCst)
    }
}
