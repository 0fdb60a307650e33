//! Port traits: the hexagonal boundary between the prop's behaviour and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Orchestrator / LidMonitor (domain)
//! ```
//!
//! Driven adapters (arm motor, lid switches, event sinks) implement these
//! traits.  The domain consumes them via generics, so behaviour logic
//! never touches GPIO directly and runs unchanged against test doubles.

use std::sync::mpsc::Receiver;

use crate::error::{ActuatorError, SensorError};
use crate::fsm::Action;
use crate::scheduler::TimerId;

use super::lid::{LidLevels, SwitchEdge};

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the orchestrator commands the finger arm through this.
pub trait ArmActuator: Send {
    /// Cut motor power.
    fn stop(&mut self) -> Result<(), ActuatorError>;

    /// Push the arm out towards the lid toggle.
    fn forward(&mut self) -> Result<(), ActuatorError>;

    /// Pull the arm back into the box.
    fn backward(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the two lid switches.
pub trait SwitchSensor: Send {
    /// Read both switch levels.
    fn read(&mut self) -> Result<LidLevels, SensorError>;

    /// Hand over the edge event stream.  Returns `Some` once; later calls
    /// and sources without edge support return `None`.
    fn edges(&mut self) -> Option<Receiver<SwitchEdge>>;

    /// Check the lines for changes the edge source may have missed and
    /// push an edge for each.  Called whenever the watcher has been idle
    /// for one poll interval.  Sources with reliable interrupts keep the
    /// default no-op.
    fn poll(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The orchestrator emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Timer delegate (decouples the timer queue from the engine)
// ───────────────────────────────────────────────────────────────

/// Callback the [`TimerQueue`](crate::scheduler::TimerQueue) worker
/// invokes when a timer expires.
///
/// The state machine implements this by stimulating itself with the
/// action; the queue knows nothing about states or transitions.
pub trait TimerDelegate: Send + Sync {
    fn on_timer_fired(&self, id: TimerId, action: Action);
}
