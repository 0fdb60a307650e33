//! Unified error types for the startle controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level wiring's error handling uniform.  The engine, timer and
//! hardware variants are `Copy` so they can be handed across threads and
//! logged without allocation.

use core::fmt;

use crate::fsm::{Action, ObserverId, State};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The state machine rejected a request.
    Fsm(FsmError),
    /// A timer action could not be scheduled.
    Timer(TimerError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// A sensor could not be read.
    Sensor(SensorError),
    /// A worker thread could not be started.
    Spawn(&'static str),
    /// A worker thread panicked.
    Panicked(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fsm(e) => write!(f, "fsm: {e}"),
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Spawn(name) => write!(f, "failed to spawn thread '{name}'"),
            Self::Panicked(name) => write!(f, "thread '{name}' panicked"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// State machine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmError {
    /// The action has no entry for the current state.
    InvalidAction { state: State, action: Action },
    /// A raw state index did not name any state.
    UnknownState(u8),
    /// The observer registry is at capacity.
    RegistryFull,
    /// The observer id is not registered.
    UnknownObserver(ObserverId),
}

impl fmt::Display for FsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAction { state, action } => {
                write!(f, "action {action} not accepted in state {state}")
            }
            Self::UnknownState(raw) => write!(f, "unknown state index {raw}"),
            Self::RegistryFull => write!(f, "observer registry full"),
            Self::UnknownObserver(id) => write!(f, "unknown observer {id}"),
        }
    }
}

impl std::error::Error for FsmError {}

impl From<FsmError> for Error {
    fn from(e: FsmError) -> Self {
        Self::Fsm(e)
    }
}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Every timer slot is occupied.
    QueueFull,
    /// The timer queue has been stopped.
    Stopped,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "timer queue full"),
            Self::Stopped => write!(f, "timer queue stopped"),
        }
    }
}

impl std::error::Error for TimerError {}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// A motor GPIO write failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// A switch GPIO read failed.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
