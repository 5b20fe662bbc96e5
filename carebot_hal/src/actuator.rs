//! Actuator driver: stepped interpolated moves and emergency halt.
//!
//! The `ActuatorDriver` owns the channel state and the output backend.
//!
//! # Concurrency
//!
//! - Motion ownership: one `move_to` at a time. A second caller is
//!   rejected with `MotionError::Busy`, it never waits and never interleaves.
//! - Channel state and backend sit behind one short, never-awaited lock.
//!   A tick writes all four channels under that lock, so readers always see
//!   whole ticks.
//! - Cancellation: `emergency_halt` bumps an atomic halt epoch, then zeroes
//!   the outputs under the lock. A move compares its starting epoch under
//!   the same lock before every tick, so no tick can land after a halt.
//!   It does not need the motion lock and never waits for a move.

use carebot_common::consts::CHANNEL_COUNT;
use carebot_common::hal::output::{ActuatorOutput, OutputError};
use carebot_common::hal::types::{ChannelState, DriveCommand, IntensityBand};
use carebot_common::posture::{Channel, TargetProfile};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Error types for actuator moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotionError {
    /// Another move currently owns the channels.
    #[error("Actuator busy: another move is in progress")]
    Busy,

    /// The move was interrupted by an emergency halt.
    #[error("Move interrupted by emergency halt")]
    Halted,

    /// `steps` was zero.
    #[error("A move needs at least one step")]
    InvalidSteps,

    /// The driver has been released; outputs are disabled.
    #[error("Actuator driver has been released")]
    Released,

    /// Backend fault while driving the channels.
    #[error("Motion failure: {0}")]
    Output(#[from] OutputError),
}

impl MotionError {
    /// Whether this is a hardware fault rather than an intentional
    /// interruption or an ownership conflict.
    #[inline]
    pub fn is_fault(&self) -> bool {
        matches!(self, MotionError::Output(_))
    }
}

/// Channel state plus the backend that realises it.
struct OutputBank {
    state: ChannelState,
    output: Box<dyn ActuatorOutput>,
}

/// Driver for the four linear actuators.
pub struct ActuatorDriver {
    /// State and backend, locked per tick only
    bank: Mutex<OutputBank>,
    /// Motion ownership; held for the whole duration of a move
    motion: tokio::sync::Mutex<()>,
    /// Incremented by every emergency halt
    halt_epoch: AtomicU64,
    /// Set once by `release`
    released: AtomicBool,
    /// Drive intensity clamp band
    band: IntensityBand,
    /// Backend identifier for logs
    backend: &'static str,
}

impl ActuatorDriver {
    /// Initialise the backend and create a driver with every channel at 0%.
    ///
    /// # Errors
    /// Returns the backend's `OutputError` if `init()` fails.
    pub fn new(mut output: Box<dyn ActuatorOutput>, band: IntensityBand) -> Result<Self, OutputError> {
        output.init()?;
        let backend = output.name();

        info!(
            "Actuator driver ready: backend={}, intensity band {:.0}-{:.0}%",
            backend, band.min, band.max
        );

        Ok(Self {
            bank: Mutex::new(OutputBank {
                state: ChannelState::default(),
                output,
            }),
            motion: tokio::sync::Mutex::new(()),
            halt_epoch: AtomicU64::new(0),
            released: AtomicBool::new(false),
            band,
            backend,
        })
    }

    /// Move all channels to `profile` in `steps` interpolated ticks.
    ///
    /// Each tick sets every channel to
    /// `origin + (target - origin) * tick / steps`, where `origin` is the
    /// channel value when the move started, then sleeps `step_delay`. After
    /// the last tick every channel is set exactly to its target.
    ///
    /// # Errors
    /// - `Busy` if another move is in progress
    /// - `Halted` if an emergency halt happened after this move started
    /// - `Output` if the backend fails; the tick is not recorded and the
    ///   backend is halted, so no partial batch stays energised
    pub async fn move_to(
        &self,
        profile: &TargetProfile,
        steps: u32,
        step_delay: Duration,
    ) -> Result<(), MotionError> {
        if steps == 0 {
            return Err(MotionError::InvalidSteps);
        }
        let _owner = self.motion.try_lock().map_err(|_| MotionError::Busy)?;
        if self.released.load(Ordering::SeqCst) {
            return Err(MotionError::Released);
        }

        let epoch = self.halt_epoch.load(Ordering::SeqCst);
        let origin = self.bank.lock().state.values;
        let targets = profile.values();

        debug!(
            "Move started: {:?} -> {:?} in {} steps of {:?}",
            origin, targets, steps, step_delay
        );

        for tick in 1..=steps {
            let ratio = f64::from(tick) / f64::from(steps);
            let mut next = [0.0; CHANNEL_COUNT];
            for (i, value) in next.iter_mut().enumerate() {
                *value = origin[i] + (targets[i] - origin[i]) * ratio;
            }

            self.apply_tick(epoch, &next)?;
            tokio::time::sleep(step_delay).await;
        }

        // Snap to the exact targets, dropping interpolation residue.
        self.apply_tick(epoch, &targets)?;

        debug!("Move complete: {:?}", targets);
        Ok(())
    }

    /// Apply one batch of channel values, unless a halt intervened.
    fn apply_tick(&self, epoch: u64, next: &[f64; CHANNEL_COUNT]) -> Result<(), MotionError> {
        let mut bank = self.bank.lock();
        if self.halt_epoch.load(Ordering::SeqCst) != epoch {
            return Err(MotionError::Halted);
        }

        let OutputBank { state, output } = &mut *bank;
        let mut staged = *state;
        for channel in Channel::ALL {
            let i = channel.index();
            let command = self.band.command(state.values[i], next[i]);
            if let Err(e) = output.apply(channel, command) {
                // Channels before this one already took the new command.
                output.halt();
                state.drive = [DriveCommand::NEUTRAL; CHANNEL_COUNT];
                error!("Output fault on {:?}, batch aborted and outputs halted: {}", channel, e);
                return Err(e.into());
            }
            staged.values[i] = next[i];
            staged.drive[i] = command;
        }
        *state = staged;
        Ok(())
    }

    /// Stop every channel now: direction neutral, intensity zero.
    ///
    /// Safe from any thread, including an input callback. Does not wait for
    /// a running move; that move observes the halt at its next tick and
    /// returns `MotionError::Halted`. Idempotent.
    pub fn emergency_halt(&self) {
        let halts = self.halt_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let mut bank = self.bank.lock();
        bank.output.halt();
        bank.state.drive = [DriveCommand::NEUTRAL; CHANNEL_COUNT];
        drop(bank);

        error!("⛔ Emergency halt #{}: all actuators stopped", halts);
    }

    /// Halt, then disable the backend. Later moves fail with `Released`.
    ///
    /// Idempotent; only the first call touches the backend.
    pub fn release(&self) -> Result<(), OutputError> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.emergency_halt();
        self.bank.lock().output.disable()?;
        info!("🧹 Actuator outputs released ({})", self.backend);
        Ok(())
    }

    /// Guard that releases the driver when dropped.
    pub fn release_guard(self: &Arc<Self>) -> ReleaseGuard {
        ReleaseGuard {
            driver: Arc::clone(self),
        }
    }

    /// Copy of the current channel state.
    pub fn channel_state(&self) -> ChannelState {
        self.bank.lock().state
    }

    /// Backend-reported fault, if any.
    pub fn health(&self) -> Option<String> {
        self.bank.lock().output.fault()
    }

    /// Whether a move currently owns the channels.
    pub fn is_moving(&self) -> bool {
        self.motion.try_lock().is_err()
    }

    /// Whether `release` has run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Number of emergency halts since construction.
    pub fn halt_count(&self) -> u64 {
        self.halt_epoch.load(Ordering::SeqCst)
    }

    /// Backend identifier.
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }
}

/// Releases the actuator driver on drop, on every exit path of its owner.
#[must_use = "the driver is released as soon as the guard is dropped"]
pub struct ReleaseGuard {
    driver: Arc<ActuatorDriver>,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if let Err(e) = self.driver.release() {
            error!("Actuator release failed: {}", e);
        }
    }
}
