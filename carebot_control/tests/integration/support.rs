//! Shared rig: simulated driver, switchable gate, recording alert sink.

use async_trait::async_trait;
use carebot_common::alert::{AlertEvent, AlertSink, Severity};
use carebot_common::hal::types::IntensityBand;
use carebot_common::posture::{PostureCatalog, RotationSequence};
use carebot_control::safety::gate::{CheckOutcome, SafetyCheck, SafetyGate};
use carebot_control::scheduler::SchedulerTiming;
use carebot_control::RotationScheduler;
use carebot_hal::drivers::simulation::{FaultSwitch, SimulationOutput};
use carebot_hal::ActuatorDriver;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Rotation interval used by every rig.
pub const INTERVAL: Duration = Duration::from_secs(60);

/// Alert sink that keeps everything.
#[derive(Default)]
pub struct Recorder(Mutex<Vec<AlertEvent>>);

impl Recorder {
    pub fn events(&self) -> Vec<AlertEvent> {
        self.0.lock().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.0.lock().iter().filter(|e| e.severity == severity).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

impl AlertSink for Recorder {
    fn notify(&self, event: AlertEvent) {
        self.0.lock().push(event);
    }
}

/// Check whose outcome the test sets.
pub struct Switchable {
    pub name: &'static str,
    pub outcome: Arc<Mutex<CheckOutcome>>,
}

#[async_trait]
impl SafetyCheck for Switchable {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn evaluate(&self) -> CheckOutcome {
        self.outcome.lock().clone()
    }
}

pub struct Rig {
    pub scheduler: RotationScheduler,
    pub driver: Arc<ActuatorDriver>,
    pub alerts: Arc<Recorder>,
    pub faults: FaultSwitch,
    pub presence: Arc<Mutex<CheckOutcome>>,
}

impl Rig {
    pub fn set_presence(&self, outcome: CheckOutcome) {
        *self.presence.lock() = outcome;
    }

    /// Spawn the timer loop and let the initial move finish.
    pub async fn start(&self) -> tokio::task::JoinHandle<()> {
        let scheduler = self.scheduler.clone();
        let handle = tokio::spawn(async move { scheduler.run().await });
        settle().await;
        handle
    }
}

/// Scheduler on a simulated driver; moves take 3 x 100 ms.
pub fn rig() -> Rig {
    let faults = FaultSwitch::new();
    let output = SimulationOutput::new().with_fault_switch(faults.clone());
    let driver = Arc::new(ActuatorDriver::new(Box::new(output), IntensityBand::STANDARD).unwrap());
    let presence = Arc::new(Mutex::new(CheckOutcome::Ok));
    let gate = SafetyGate::builder()
        .check(Switchable {
            name: "presence",
            outcome: Arc::clone(&presence),
        })
        .build();
    let alerts = Arc::new(Recorder::default());

    let scheduler = RotationScheduler::new(
        Arc::clone(&driver),
        gate,
        alerts.clone(),
        PostureCatalog::standard(),
        RotationSequence::standard(),
        SchedulerTiming {
            interval: INTERVAL,
            steps: 3,
            step_delay: Duration::from_millis(100),
        },
    );

    Rig {
        scheduler,
        driver,
        alerts,
        faults,
        presence,
    }
}

/// Long enough for any in-flight move to finish.
pub async fn settle() {
    tokio::time::sleep(Duration::from_secs(1)).await;
}
