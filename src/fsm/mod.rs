//! Synchronised finite state machine engine.
//!
//! ```text
//!  ┌──────────────┐  stimulate(action)   ┌─────────────────────────────┐
//!  │ switch edges │─────────────────────▶│  StateMachine               │
//!  │ timer queue  │─────────────────────▶│  Mutex<{ state, registry }> │
//!  │ orchestrator │─────────────────────▶│  table::next_state()        │
//!  └──────────────┘                      └──────────────┬──────────────┘
//!                                                       │ notify_all
//!                                                       ▼
//!                                     wait_state_change(id) per observer
//! ```
//!
//! Every producer calls [`StateMachine::stimulate`], which looks the
//! `(state, action)` pair up in [`table::next_state`] under a single lock.
//! A real transition marks every registered observer pending and wakes
//! all waiters; each waiter filters on its own flag.  Notification is
//! level-triggered: an observer that is slow to come back sees only the
//! latest state, never a queue of intermediate ones.

pub mod registry;
pub mod table;

use core::fmt;

use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};

use crate::app::ports::TimerDelegate;
use crate::error::FsmError;
use crate::scheduler::TimerId;
use registry::Registry;

pub use registry::{MAX_OBSERVERS, ObserverId};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every state the prop can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    Idle = 0,
    Powerup = 1,
    Alarming = 2,
    Resetting = 3,
    BeforeShutdown = 4,
    Shutdown = 5,
    ScareSetup = 6,
    Scare1 = 7,
    Scare2 = 8,
    Scare3 = 9,
    TimeoutThenReset = 10,
    ResettingRetry = 11,
    Offence = 12,
    SuspicionSetup = 13,
    Suspicion1 = 14,
    Suspicion2 = 15,
    Suspicion3 = 16,
    SlowFingerSetup = 17,
    SlowFinger1 = 18,
    SlowFinger2 = 19,
}

impl State {
    pub const COUNT: usize = 20;

    /// All states in discriminant order.
    pub const ALL: [State; State::COUNT] = [
        State::Idle,
        State::Powerup,
        State::Alarming,
        State::Resetting,
        State::BeforeShutdown,
        State::Shutdown,
        State::ScareSetup,
        State::Scare1,
        State::Scare2,
        State::Scare3,
        State::TimeoutThenReset,
        State::ResettingRetry,
        State::Offence,
        State::SuspicionSetup,
        State::Suspicion1,
        State::Suspicion2,
        State::Suspicion3,
        State::SlowFingerSetup,
        State::SlowFinger1,
        State::SlowFinger2,
    ];

    /// Convert a raw index back to a `State`.
    pub fn from_index(idx: u8) -> Result<Self, FsmError> {
        Self::ALL
            .get(idx as usize)
            .copied()
            .ok_or(FsmError::UnknownState(idx))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Powerup => "Powerup",
            Self::Alarming => "Alarming",
            Self::Resetting => "Resetting",
            Self::BeforeShutdown => "BeforeShutdown",
            Self::Shutdown => "Shutdown",
            Self::ScareSetup => "ScareSetup",
            Self::Scare1 => "Scare1",
            Self::Scare2 => "Scare2",
            Self::Scare3 => "Scare3",
            Self::TimeoutThenReset => "TimeoutThenReset",
            Self::ResettingRetry => "ResettingRetry",
            Self::Offence => "Offence",
            Self::SuspicionSetup => "SuspicionSetup",
            Self::Suspicion1 => "Suspicion1",
            Self::Suspicion2 => "Suspicion2",
            Self::Suspicion3 => "Suspicion3",
            Self::SlowFingerSetup => "SlowFingerSetup",
            Self::SlowFinger1 => "SlowFinger1",
            Self::SlowFinger2 => "SlowFinger2",
        }
    }

    /// `true` for the absorbing terminal state.
    pub fn is_terminal(self) -> bool {
        self == Self::Shutdown
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Stimuli the machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    /// No-op stimulus.
    Next = 0,
    /// Both lid switches low.
    ArmReset = 1,
    /// Both lid switches high.
    ArmAlarm = 2,
    /// Internal switch low, external switch high.
    ArmMotion = 3,
    /// Internal switch high, external switch low.
    ArmOff = 4,
    Shutdown = 5,
    ShutdownDone = 6,
    Timeout = 7,
    ScareTimeout = 8,
    ScareExit = 9,
    SuspicionTimeout = 10,
    SuspicionExit = 11,
    SlowfingerTimeout = 12,
}

impl Action {
    pub const COUNT: usize = 13;

    pub const ALL: [Action; Action::COUNT] = [
        Action::Next,
        Action::ArmReset,
        Action::ArmAlarm,
        Action::ArmMotion,
        Action::ArmOff,
        Action::Shutdown,
        Action::ShutdownDone,
        Action::Timeout,
        Action::ScareTimeout,
        Action::ScareExit,
        Action::SuspicionTimeout,
        Action::SuspicionExit,
        Action::SlowfingerTimeout,
    ];

    /// Convert a raw index back to an `Action`, if it names one.
    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(idx as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::ArmReset => "ArmReset",
            Self::ArmAlarm => "ArmAlarm",
            Self::ArmMotion => "ArmMotion",
            Self::ArmOff => "ArmOff",
            Self::Shutdown => "Shutdown",
            Self::ShutdownDone => "ShutdownDone",
            Self::Timeout => "Timeout",
            Self::ScareTimeout => "ScareTimeout",
            Self::ScareExit => "ScareExit",
            Self::SuspicionTimeout => "SuspicionTimeout",
            Self::SuspicionExit => "SuspicionExit",
            Self::SlowfingerTimeout => "SlowfingerTimeout",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Stimulus outcome
// ---------------------------------------------------------------------------

/// Result of one [`StateMachine::stimulate`] call.
///
/// The resulting state is always reported, whether or not the action was
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stimulus {
    pub action: Action,
    /// State before the action was applied.
    pub from: State,
    /// State after the action was applied (equal to `from` when rejected).
    pub state: State,
    /// Set when the table had no entry for `(from, action)`.
    pub rejected: Option<FsmError>,
}

impl Stimulus {
    pub fn accepted(&self) -> bool {
        self.rejected.is_none()
    }

    /// `true` when the action moved the machine to a different state.
    pub fn changed(&self) -> bool {
        self.from != self.state
    }

    /// Collapse into a `Result` carrying the resulting state.
    pub fn into_result(self) -> Result<State, FsmError> {
        match self.rejected {
            Some(e) => Err(e),
            None => Ok(self.state),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

struct Inner {
    state: State,
    registry: Registry,
}

/// The shared engine.  Wrap it in an `Arc` and hand it to every producer
/// and observer.
pub struct StateMachine {
    inner: Mutex<Inner>,
    changed: Condvar,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// A fresh engine sits in `Shutdown` until its first observer registers.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::Shutdown,
                registry: Registry::new(),
            }),
            changed: Condvar::new(),
        }
    }

    /// Register an observer.  The first registration powers the machine up.
    ///
    /// The new observer is pending, so its first
    /// [`wait_state_change`](Self::wait_state_change) returns immediately.
    pub fn register(&self) -> Result<ObserverId, FsmError> {
        let mut inner = self.inner.lock();
        let was_empty = inner.registry.is_empty();
        let id = inner.registry.insert()?;
        if was_empty {
            inner.state = State::Powerup;
            info!("FSM: first observer {id} registered, state -> Powerup");
        } else {
            debug!("FSM: observer {id} registered ({} total)", inner.registry.len());
        }
        Ok(id)
    }

    /// Deregister an observer.  Removing the last one shuts the machine down.
    pub fn deregister(&self, id: ObserverId) -> Result<(), FsmError> {
        let mut inner = self.inner.lock();
        inner.registry.remove(id)?;
        if inner.registry.is_empty() {
            inner.state = State::Shutdown;
            info!("FSM: last observer {id} left, state -> Shutdown");
        } else {
            debug!("FSM: observer {id} deregistered");
        }
        // Wake anyone blocked on the removed id so they see it is gone.
        self.changed.notify_all();
        Ok(())
    }

    /// Apply `action` to the current state.
    pub fn stimulate(&self, action: Action) -> Stimulus {
        let mut inner = self.inner.lock();
        let from = inner.state;

        let Some(next) = table::next_state(from, action) else {
            let err = FsmError::InvalidAction {
                state: from,
                action,
            };
            warn!("FSM: rejected {action} in {from}");
            return Stimulus {
                action,
                from,
                state: from,
                rejected: Some(err),
            };
        };

        debug!("FSM: {action} in {from} -> {next}");
        if next != from {
            inner.state = next;
            inner.registry.mark_all();
            self.changed.notify_all();
            info!("FSM transition: {from} -> {next} ({action})");
        }

        Stimulus {
            action,
            from,
            state: next,
            rejected: None,
        }
    }

    /// Block until this observer has a pending change, then return the
    /// current state.
    pub fn wait_state_change(&self, id: ObserverId) -> Result<State, FsmError> {
        let mut inner = self.inner.lock();
        loop {
            if inner.registry.take_pending(id)? {
                return Ok(inner.state);
            }
            self.changed.wait(&mut inner);
        }
    }

    /// Force-wake `id` as though a transition happened.  The observer gets
    /// the current state and cannot tell this apart from a real change.
    pub fn cancel_wait(&self, id: ObserverId) -> Result<(), FsmError> {
        let mut inner = self.inner.lock();
        inner.registry.mark(id)?;
        self.changed.notify_all();
        Ok(())
    }

    pub fn current_state(&self) -> State {
        self.inner.lock().state
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().registry.len()
    }
}

impl TimerDelegate for StateMachine {
    fn on_timer_fired(&self, id: TimerId, action: Action) {
        let outcome = self.stimulate(action);
        debug!(
            "FSM: timer {id} delivered {action} ({} -> {})",
            outcome.from, outcome.state
        );
    }
}
