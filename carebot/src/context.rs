//! The CareBot context object.
//!
//! Built once at startup and handed to every consumer by `Arc`: the
//! timer task, the request handlers and the emergency stop input all see
//! the same driver and scheduler. There are no process-wide singletons.

use crate::alerts::{AlertHistory, ChannelAlertSink, FanOutSink, TracingAlertSink};
use crate::error::StartupError;
use carebot_common::alert::{AlertEvent, AlertSink};
use carebot_common::config::CareBotConfig;
use carebot_common::consts::ALERT_QUERY_LIMIT;
use carebot_common::hal::output::ActuatorOutput;
use carebot_common::hal::types::DriveCommand;
use carebot_common::posture::{Channel, Posture, PostureCatalog};
use carebot_common::sensor::{ObstructionDetector, PressureSensor};
use carebot_control::scheduler::SchedulerTiming;
use carebot_control::state::machine::Transition;
use carebot_control::{CycleError, EmergencyStop, RotationScheduler, SafetyGate, SchedulerSnapshot};
use carebot_hal::drivers::simulation::SimulatedPressure;
use carebot_hal::{ActuatorDriver, DriverRegistry, ReleaseGuard};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Full status for the dashboard: scheduler snapshot plus actuators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareBotStatus {
    /// Scheduler state.
    #[serde(flatten)]
    pub scheduler: SchedulerSnapshot,
    /// Current extension per channel [%].
    pub actuator_positions: BTreeMap<Channel, f64>,
    /// Last drive command per channel.
    pub actuator_drive: BTreeMap<Channel, DriveCommand>,
    /// A move currently owns the actuators.
    pub moving: bool,
    /// Output backend name.
    pub driver: &'static str,
    /// Emergency halts since start.
    pub emergency_halts: u64,
    /// When this status was taken.
    pub timestamp: DateTime<Utc>,
}

/// Everything the core needs, wired once.
pub struct CareBot {
    config: CareBotConfig,
    driver: Arc<ActuatorDriver>,
    scheduler: RotationScheduler,
    estop: EmergencyStop,
    alerts: Arc<FanOutSink>,
    history: Arc<AlertHistory>,
}

impl CareBot {
    /// Build from configuration: backend from the registry, pressure from
    /// the simulated sensor (`simulation.pressure`), no obstruction detector.
    pub fn from_config(
        config: CareBotConfig,
        registry: &DriverRegistry,
    ) -> Result<Self, StartupError> {
        let output = registry.create(&config.driver)?;
        let sensor = Arc::new(SimulatedPressure::new(config.simulation.pressure));
        Self::from_parts(config, output, sensor, None)
    }

    /// Build from an explicit backend and sensors.
    pub fn from_parts(
        config: CareBotConfig,
        output: Box<dyn ActuatorOutput>,
        sensor: Arc<dyn PressureSensor>,
        detector: Option<Arc<dyn ObstructionDetector>>,
    ) -> Result<Self, StartupError> {
        config.validate()?;
        let catalog = PostureCatalog::standard();
        let sequence = config.schedule.rotation_sequence()?;

        let driver = Arc::new(ActuatorDriver::new(output, config.motion.band())?);

        let history = Arc::new(AlertHistory::new(config.alerts.history_capacity));
        let alerts = Arc::new(FanOutSink::new(vec![
            Arc::new(TracingAlertSink) as Arc<dyn AlertSink>,
            history.clone() as Arc<dyn AlertSink>,
        ]));

        let gate = SafetyGate::standard(&config.safety, sensor, detector, Arc::clone(&driver));
        let scheduler = RotationScheduler::new(
            Arc::clone(&driver),
            gate,
            alerts.clone(),
            catalog,
            sequence,
            SchedulerTiming::from_config(&config),
        );
        let estop = EmergencyStop::new(Arc::clone(&driver), alerts.clone(), config.estop.debounce());

        info!(
            "🔧 CareBot context ready: service={}, driver={}, interval={} min",
            config.shared.service_name,
            driver.backend_name(),
            config.schedule.rotation_interval_s / 60
        );

        Ok(Self {
            config,
            driver,
            scheduler,
            estop,
            alerts,
            history,
        })
    }

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Run the rotation timer loop until `stop()`.
    pub async fn run(&self) {
        self.scheduler.run().await;
    }

    /// End the timer loop. The actuators are released separately.
    pub fn stop(&self) -> Transition {
        self.scheduler.stop()
    }

    /// Guard releasing the actuator outputs when dropped.
    pub fn release_guard(&self) -> ReleaseGuard {
        self.driver.release_guard()
    }

    // ─── Command surface ────────────────────────────────────────────

    /// Rotate now; `None` takes the next posture in sequence.
    pub async fn request_manual_rotation(
        &self,
        target: Option<Posture>,
    ) -> Result<Posture, CycleError> {
        self.scheduler.request_manual_rotation(target).await
    }

    /// Pause automatic rotation, indefinitely or for `duration`.
    pub fn pause(&self, duration: Option<Duration>) -> Transition {
        self.scheduler.pause(duration)
    }

    /// Resume automatic rotation.
    pub fn resume(&self) -> Transition {
        self.scheduler.resume()
    }

    /// Operator emergency stop: halt every actuator and pause the schedule.
    ///
    /// Unlike the hardware button, this also pauses; rotation resumes only
    /// after an explicit `resume()`.
    pub fn emergency_halt(&self) {
        self.driver.emergency_halt();
        self.scheduler.pause(None);
        self.alerts.notify(AlertEvent::critical(
            "긴급 정지 실행됨: 수동 확인 후 재개하세요 (emergency stop executed)",
        ));
    }

    /// Edge from the hardware emergency stop button. See [`EmergencyStop::trigger`].
    pub fn press_emergency_button(&self) -> bool {
        self.estop.trigger()
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Scheduler snapshot plus actuator state.
    pub fn status(&self) -> CareBotStatus {
        let channels = self.driver.channel_state();
        CareBotStatus {
            scheduler: self.scheduler.snapshot(),
            actuator_positions: Channel::ALL.iter().map(|&c| (c, channels.value(c))).collect(),
            actuator_drive: Channel::ALL.iter().map(|&c| (c, channels.drive(c))).collect(),
            moving: self.driver.is_moving(),
            driver: self.driver.backend_name(),
            emergency_halts: self.driver.halt_count(),
            timestamp: Utc::now(),
        }
    }

    /// Most recent alerts, newest first; `None` means the default limit.
    pub fn recent_alerts(&self, limit: Option<usize>) -> Vec<AlertEvent> {
        self.history.recent(limit.unwrap_or(ALERT_QUERY_LIMIT))
    }

    /// Add an alert consumer.
    pub fn subscribe(&self, sink: Arc<dyn AlertSink>) {
        self.alerts.subscribe(sink);
    }

    /// New channel receiving every alert from now on.
    pub fn alert_channel(&self) -> mpsc::UnboundedReceiver<AlertEvent> {
        let (sink, rx) = ChannelAlertSink::new();
        self.alerts.subscribe(Arc::new(sink));
        rx
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Loaded configuration.
    pub fn config(&self) -> &CareBotConfig {
        &self.config
    }

    /// Shared actuator driver.
    pub fn driver(&self) -> &Arc<ActuatorDriver> {
        &self.driver
    }

    /// Rotation scheduler handle.
    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }
}
