//! Scheduler lifecycle: Stopped → Running ⇄ Paused → Stopped.
//!
//! `Stopped` is both the initial and the terminal state: once a machine
//! has left `Stopped`, `Start` is never accepted again, so one scheduler
//! runs at most one timer loop. The timer keeps ticking while `Paused`;
//! ticks that land there are skipped.

use serde::Serialize;
use std::fmt;

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// Not running; initial and terminal.
    #[default]
    Stopped,
    /// Timer loop active, cycles are performed.
    Running,
    /// Timer loop active, cycles are skipped.
    Paused,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchedulerState::Stopped => "stopped",
            SchedulerState::Running => "running",
            SchedulerState::Paused => "paused",
        })
    }
}

/// Result of a state transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Transition succeeded, new state.
    Ok(SchedulerState),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

impl Transition {
    /// Whether the transition was applied.
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, Transition::Ok(_))
    }
}

/// Event that can trigger a scheduler transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Timer loop starting.
    Start,
    /// Operator pause.
    Pause,
    /// Operator resume or pause expiry.
    Resume,
    /// Shutdown.
    Stop,
}

/// Scheduler state holder.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStateMachine {
    state: SchedulerState,
    /// Set by the first accepted `Start`; never cleared.
    started: bool,
}

impl SchedulerStateMachine {
    /// New machine in `Stopped`.
    pub const fn new() -> Self {
        Self {
            state: SchedulerState::Stopped,
            started: false,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Timer loop active (running or paused).
    #[inline]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running | SchedulerState::Paused)
    }

    /// Cycles are being skipped.
    #[inline]
    pub const fn is_paused(&self) -> bool {
        matches!(self.state, SchedulerState::Paused)
    }

    /// Stopped after having run; no further transition is accepted.
    #[inline]
    pub const fn is_finished(&self) -> bool {
        self.started && matches!(self.state, SchedulerState::Stopped)
    }

    /// Attempt a transition. A rejected event leaves the state unchanged.
    pub fn handle_event(&mut self, event: SchedulerEvent) -> Transition {
        use SchedulerEvent::*;
        use SchedulerState::*;

        let next = match (self.state, event) {
            (Stopped, Start) if !self.started => Running,
            (Running, Pause) => Paused,
            (Paused, Resume) => Running,
            (Running | Paused, Stop) => Stopped,
            _ => {
                return Transition::Rejected(invalid_transition_reason(
                    self.state,
                    event,
                    self.started,
                ));
            }
        };

        self.started = true;
        self.state = next;
        Transition::Ok(next)
    }
}

fn invalid_transition_reason(
    state: SchedulerState,
    event: SchedulerEvent,
    started: bool,
) -> &'static str {
    use SchedulerEvent::*;
    use SchedulerState::*;
    match (state, event) {
        (Stopped, _) if started => "Stopped: scheduler already ran, create a new one",
        (Stopped, _) => "Stopped: only Start allowed",
        (Running, Start) => "Running: already started",
        (Running, _) => "Running: already running",
        (Paused, Pause) => "Paused: already paused",
        (Paused, _) => "Paused: only Resume or Stop allowed",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
