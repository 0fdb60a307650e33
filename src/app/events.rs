//! Outbound application events.
//!
//! The orchestrator emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use std::time::Duration;

use crate::fsm::{Action, State};

/// Structured events emitted by the behaviour loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The orchestrator is running (carries the state it first saw).
    Started(State),

    /// The orchestrator woke up in a state and applied its side effects.
    StateEntered(State),

    /// A stimulus issued by the orchestrator had no table entry.
    StimulusRejected { state: State, action: Action },

    /// A timed action was armed.
    TimerArmed { action: Action, delay: Duration },

    /// An actuator or sensor call failed; the loop carries on.
    HardwareFault(State),

    /// The orchestrator left its loop and deregistered.
    Stopped,
}
