//! Periodic patient rotation.
//!
//! `RotationScheduler` is a cloneable handle; the timer task, the command
//! surface and the status query share one instance.
//!
//! # Cycle
//!
//! 1. Advance the sequence index (cyclic). The advance is kept even when
//!    the cycle does not move: a blocked posture is not retried, the next
//!    cycle advances past it.
//! 2. Ask the safety gate. Blocked: warning alert, manual check required,
//!    nothing else changes.
//! 3. Move. Success: posture, counter and timestamp updated, info alert.
//!    Busy: warning alert, no halt. Any other failure (including a halt):
//!    emergency halt, critical alert, the loop keeps running.
//!
//! # Locking
//!
//! Scheduler data sits behind a short `parking_lot` lock that is never held
//! across an await. Motion ownership belongs to the driver, so a manual
//! rotation and a timer cycle can never interleave their ticks.

use crate::error::{CycleError, CycleOutcome};
use crate::safety::gate::{SafetyGate, SafetyVerdict};
use crate::state::machine::{SchedulerEvent, SchedulerState, SchedulerStateMachine, Transition};
use carebot_common::alert::{AlertEvent, AlertSink};
use carebot_common::config::CareBotConfig;
use carebot_common::posture::{Posture, PostureCatalog, RotationSequence};
use carebot_hal::{ActuatorDriver, MotionError};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{error, info, warn};

// ─── Timing ─────────────────────────────────────────────────────────

/// Interval and move parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerTiming {
    /// Wait between rotations.
    pub interval: Duration,
    /// Interpolation ticks per move.
    pub steps: u32,
    /// Pause between ticks.
    pub step_delay: Duration,
}

impl SchedulerTiming {
    /// Timing from the loaded configuration.
    pub fn from_config(config: &CareBotConfig) -> Self {
        Self {
            interval: config.schedule.interval(),
            steps: config.motion.steps,
            step_delay: config.motion.step_delay(),
        }
    }
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self::from_config(&CareBotConfig::default())
    }
}

// ─── Snapshot ───────────────────────────────────────────────────────

/// Read-only copy of the scheduler state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerSnapshot {
    /// Lifecycle state.
    pub state: SchedulerState,
    /// Timer loop active.
    pub is_running: bool,
    /// Cycles are skipped.
    pub is_paused: bool,
    /// Posture last reached.
    pub current_position: Posture,
    /// Display label of `current_position`.
    pub current_position_label: String,
    /// Last successful rotation.
    pub last_rotation_time: Option<DateTime<Utc>>,
    /// When the running interval wait ends.
    pub next_rotation_time: Option<DateTime<Utc>>,
    /// Successful rotations since start (initial posture excluded).
    pub total_rotations: u64,
    /// Rotation interval [min].
    pub rotation_interval_minutes: u64,
}

// ─── Scheduler ──────────────────────────────────────────────────────

/// Who asked for a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Scheduled,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Scheduled => "scheduled",
            Trigger::Manual => "manual",
        })
    }
}

#[derive(Debug)]
struct SchedulerData {
    machine: SchedulerStateMachine,
    index: usize,
    current: Posture,
    last_rotation: Option<DateTime<Utc>>,
    next_rotation: Option<DateTime<Utc>>,
    total_rotations: u64,
    /// Bumped by every pause and resume; a timed resume only fires if unchanged
    pause_generation: u64,
}

struct Inner {
    driver: Arc<ActuatorDriver>,
    gate: SafetyGate,
    alerts: Arc<dyn AlertSink>,
    catalog: PostureCatalog,
    sequence: RotationSequence,
    timing: SchedulerTiming,
    data: Mutex<SchedulerData>,
    stop: Notify,
}

/// Rotation scheduler handle.
#[derive(Clone)]
pub struct RotationScheduler {
    inner: Arc<Inner>,
}

impl RotationScheduler {
    /// Create a stopped scheduler positioned at the first posture of `sequence`.
    pub fn new(
        driver: Arc<ActuatorDriver>,
        gate: SafetyGate,
        alerts: Arc<dyn AlertSink>,
        catalog: PostureCatalog,
        sequence: RotationSequence,
        timing: SchedulerTiming,
    ) -> Self {
        let current = sequence.first();
        Self {
            inner: Arc::new(Inner {
                driver,
                gate,
                alerts,
                catalog,
                sequence,
                timing,
                data: Mutex::new(SchedulerData {
                    machine: SchedulerStateMachine::new(),
                    index: 0,
                    current,
                    last_rotation: None,
                    next_rotation: None,
                    total_rotations: 0,
                    pause_generation: 0,
                }),
                stop: Notify::new(),
            }),
        }
    }

    /// Run the timer loop until `stop()`.
    ///
    /// Moves to the first posture of the sequence, then waits one interval
    /// at a time and performs a cycle after each wait unless paused. Missed
    /// intervals are never caught up. Returns immediately if this scheduler
    /// is running or has already run: a stopped scheduler stays stopped.
    pub async fn run(&self) {
        if let Transition::Rejected(reason) = self.handle_event(SchedulerEvent::Start) {
            warn!("Scheduler start rejected: {}", reason);
            return;
        }

        let interval = self.inner.timing.interval;
        info!(
            "🚀 Rotation scheduler started: every {} min, sequence {:?}",
            interval.as_secs() / 60,
            self.inner.sequence.postures()
        );

        let first = self.inner.sequence.first();
        info!("Moving to initial posture: {}", self.inner.catalog.label(first));
        match self.move_and_record(first, false).await {
            Ok(()) => {}
            Err(MotionError::Busy) => warn!("Initial posture skipped: actuators busy"),
            Err(e) => self.motion_failed(first, Trigger::Scheduled, e),
        }

        loop {
            let stopped = self.inner.stop.notified();
            tokio::pin!(stopped);
            stopped.as_mut().enable();

            {
                let mut data = self.inner.data.lock();
                if !data.machine.is_running() {
                    break;
                }
                data.next_rotation = TimeDelta::from_std(interval)
                    .ok()
                    .and_then(|delta| Utc::now().checked_add_signed(delta));
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut stopped => {}
            }

            let paused = {
                let data = self.inner.data.lock();
                if !data.machine.is_running() {
                    break;
                }
                data.machine.is_paused()
            };
            if paused {
                info!("⏸️  Scheduler paused: skipping rotation");
                continue;
            }

            self.run_cycle().await;
        }

        self.inner.data.lock().next_rotation = None;
        info!("Rotation scheduler loop exited");
    }

    /// Perform one rotation cycle now.
    ///
    /// Errors are handled here (alerts, halt) and summarised in the outcome.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let posture = self.advance_index();
        info!(
            "⏰ Rotation due: {} → {}",
            self.inner.catalog.label(self.current_posture()),
            self.inner.catalog.label(posture)
        );
        self.rotate(posture, Trigger::Scheduled).await.into()
    }

    /// Rotate now, outside the timer.
    ///
    /// Without a target, advances the sequence exactly as a timer cycle
    /// would; with a target, the sequence index is left alone. Same gate,
    /// move and alerts as a timer cycle; timer timing is untouched. A move
    /// already in progress yields `MotionError::Busy`.
    pub async fn request_manual_rotation(
        &self,
        target: Option<Posture>,
    ) -> Result<Posture, CycleError> {
        let posture = match target {
            Some(posture) => posture,
            None => self.advance_index(),
        };
        info!("Manual rotation requested: {}", self.inner.catalog.label(posture));
        self.rotate(posture, Trigger::Manual).await
    }

    /// Skip cycles until `resume()`, or for `duration` if given.
    ///
    /// A timed pause spawns its resume on the current tokio runtime; it
    /// only fires if no other pause or resume happened in between.
    pub fn pause(&self, duration: Option<Duration>) -> Transition {
        let (transition, generation) = {
            let mut data = self.inner.data.lock();
            let transition = data.machine.handle_event(SchedulerEvent::Pause);
            if transition.is_ok() {
                data.pause_generation += 1;
            }
            (transition, data.pause_generation)
        };

        match (&transition, duration) {
            (Transition::Rejected(reason), _) => warn!("Pause rejected: {}", reason),
            (Transition::Ok(_), None) => info!("⏸️  Automatic rotation paused (manual resume required)"),
            (Transition::Ok(_), Some(duration)) => {
                info!("⏸️  Automatic rotation paused for {} min", duration.as_secs() / 60);
                let scheduler = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(duration).await;
                    scheduler.resume_if_generation(generation);
                });
            }
        }
        transition
    }

    /// Resume cycles.
    pub fn resume(&self) -> Transition {
        let transition = {
            let mut data = self.inner.data.lock();
            let transition = data.machine.handle_event(SchedulerEvent::Resume);
            if transition.is_ok() {
                data.pause_generation += 1;
            }
            transition
        };
        match &transition {
            Transition::Ok(_) => info!("▶️  Automatic rotation resumed"),
            Transition::Rejected(reason) => warn!("Resume rejected: {}", reason),
        }
        transition
    }

    fn resume_if_generation(&self, generation: u64) {
        let mut data = self.inner.data.lock();
        if data.pause_generation != generation {
            return;
        }
        if data.machine.handle_event(SchedulerEvent::Resume).is_ok() {
            data.pause_generation += 1;
            drop(data);
            info!("▶️  Timed pause expired: automatic rotation resumed");
        }
    }

    /// End the timer loop. Does not halt or release the actuators.
    pub fn stop(&self) -> Transition {
        let transition = self.handle_event(SchedulerEvent::Stop);
        match &transition {
            Transition::Ok(_) => {
                self.inner.stop.notify_waiters();
                info!("🛑 Rotation scheduler stopped");
            }
            Transition::Rejected(reason) => warn!("Stop rejected: {}", reason),
        }
        transition
    }

    /// Copy of the scheduler state. Never waits on a move.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let data = self.inner.data.lock();
        SchedulerSnapshot {
            state: data.machine.state(),
            is_running: data.machine.is_running(),
            is_paused: data.machine.is_paused(),
            current_position: data.current,
            current_position_label: self.inner.catalog.label(data.current).to_string(),
            last_rotation_time: data.last_rotation,
            next_rotation_time: data.next_rotation,
            total_rotations: data.total_rotations,
            rotation_interval_minutes: self.inner.timing.interval.as_secs() / 60,
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.inner.data.lock().machine.state()
    }

    /// Posture last reached.
    pub fn current_posture(&self) -> Posture {
        self.inner.data.lock().current
    }

    /// Index of the posture most recently due.
    pub fn sequence_index(&self) -> usize {
        self.inner.data.lock().index
    }

    /// Shared actuator driver.
    pub fn driver(&self) -> &Arc<ActuatorDriver> {
        &self.inner.driver
    }

    /// Posture catalog in use.
    pub fn catalog(&self) -> &PostureCatalog {
        &self.inner.catalog
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn handle_event(&self, event: SchedulerEvent) -> Transition {
        self.inner.data.lock().machine.handle_event(event)
    }

    fn advance_index(&self) -> Posture {
        let mut data = self.inner.data.lock();
        data.index = self.inner.sequence.advance(data.index);
        self.inner.sequence.get(data.index)
    }

    /// Gate, move, bookkeeping and alerts for one rotation.
    async fn rotate(&self, posture: Posture, trigger: Trigger) -> Result<Posture, CycleError> {
        let label = self.inner.catalog.label(posture);

        match self.inner.gate.evaluate().await {
            SafetyVerdict::Blocked { reasons } => {
                let joined = reasons.join(" | ");
                warn!("⚠️  Safety check failed, {} rotation cancelled: {}", trigger, joined);
                self.emit(AlertEvent::warning(format!("자세 변환 취소됨: {joined}"), true));
                return Err(CycleError::Blocked { reasons });
            }
            SafetyVerdict::Permitted { degraded } if !degraded.is_empty() => {
                self.emit(AlertEvent::warning(
                    format!("안전 센서 확인 불가, 자세 변환 진행: {}", degraded.join(" | ")),
                    false,
                ));
            }
            SafetyVerdict::Permitted { .. } => {}
        }

        match self.move_and_record(posture, true).await {
            Ok(()) => {
                info!("✅ {} rotation complete: {}", trigger, label);
                self.emit(AlertEvent::info(format!("자세 변환 완료: {label}")));
                Ok(posture)
            }
            Err(MotionError::Busy) => {
                warn!("{} rotation to {} skipped: actuators busy", trigger, label);
                if trigger == Trigger::Scheduled {
                    self.emit(AlertEvent::warning(
                        format!("자세 변환 건너뜀: 다른 이동 진행 중 ({label})"),
                        false,
                    ));
                }
                Err(MotionError::Busy.into())
            }
            Err(e) => {
                self.motion_failed(posture, trigger, e.clone());
                Err(e.into())
            }
        }
    }

    /// Move to `posture`; on success update the current posture and,
    /// if `count`, the rotation counter and timestamp.
    async fn move_and_record(&self, posture: Posture, count: bool) -> Result<(), MotionError> {
        let profile = self.inner.catalog.profile(posture);
        let timing = self.inner.timing;
        self.inner
            .driver
            .move_to(profile, timing.steps, timing.step_delay)
            .await?;

        let mut data = self.inner.data.lock();
        data.current = posture;
        if count {
            data.total_rotations += 1;
            data.last_rotation = Some(Utc::now());
        }
        Ok(())
    }

    fn motion_failed(&self, posture: Posture, trigger: Trigger, e: MotionError) {
        error!(
            "❌ {} rotation to {} failed: {}",
            trigger,
            self.inner.catalog.label(posture),
            e
        );
        self.inner.driver.emergency_halt();
        self.emit(AlertEvent::critical(format!(
            "자세 변환 오류 발생! 즉시 확인 필요: {e}"
        )));
    }

    fn emit(&self, event: AlertEvent) {
        self.inner.alerts.notify(event);
    }
}

impl fmt::Debug for RotationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationScheduler")
            .field("data", &*self.inner.data.lock())
            .field("timing", &self.inner.timing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_common::alert::NullSink;
    use carebot_common::hal::types::IntensityBand;
    use carebot_hal::drivers::simulation::SimulationOutput;

    fn scheduler() -> RotationScheduler {
        let driver = Arc::new(
            ActuatorDriver::new(Box::new(SimulationOutput::new()), IntensityBand::STANDARD).unwrap(),
        );
        RotationScheduler::new(
            driver,
            SafetyGate::builder().build(),
            Arc::new(NullSink),
            PostureCatalog::standard(),
            RotationSequence::standard(),
            SchedulerTiming {
                interval: Duration::from_secs(60),
                steps: 2,
                step_delay: Duration::from_millis(10),
            },
        )
    }

    #[test]
    fn new_scheduler_is_stopped_at_first_posture() {
        let snapshot = scheduler().snapshot();
        assert_eq!(snapshot.state, SchedulerState::Stopped);
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.current_position, Posture::Supine);
        assert_eq!(snapshot.total_rotations, 0);
        assert_eq!(snapshot.rotation_interval_minutes, 1);
        assert!(snapshot.last_rotation_time.is_none());
    }

    #[test]
    fn pause_requires_running() {
        let scheduler = scheduler();
        assert!(matches!(scheduler.pause(None), Transition::Rejected(_)));
        assert!(matches!(scheduler.stop(), Transition::Rejected(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_advances_index_and_counts() {
        let scheduler = scheduler();
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Rotated(Posture::LeftLateral));
        assert_eq!(scheduler.sequence_index(), 1);
        assert_eq!(scheduler.snapshot().total_rotations, 1);
        assert_eq!(scheduler.current_posture(), Posture::LeftLateral);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_target_leaves_index_alone() {
        let scheduler = scheduler();
        let reached = scheduler
            .request_manual_rotation(Some(Posture::RightLateral))
            .await
            .unwrap();
        assert_eq!(reached, Posture::RightLateral);
        assert_eq!(scheduler.sequence_index(), 0);
        assert!(scheduler.snapshot().last_rotation_time.is_some());
    }

    #[test]
    fn snapshot_serializes_lowercase_state() {
        let json = serde_json::to_value(scheduler().snapshot()).unwrap();
        assert_eq!(json["state"], "stopped");
        assert_eq!(json["current_position"], "supine");
    }
}
