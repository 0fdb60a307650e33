//! Lid switch interpretation.
//!
//! The prop has two switches: one inside the box that the arm presses
//! when fully retracted, and the visitor-facing toggle on the lid.  Each
//! combination of levels maps to exactly one arm action:
//!
//! | internal | external | action      |
//! |----------|----------|-------------|
//! | low      | low      | `ArmReset`  |
//! | high     | high     | `ArmAlarm`  |
//! | low      | high     | `ArmMotion` |
//! | high     | low      | `ArmOff`    |
//!
//! Switches are not debounced; the transition table tolerates bounce.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::app::ports::SwitchSensor;
use crate::drivers::arm_motor::ArmMovement;
use crate::error::SensorError;
use crate::fsm::{Action, StateMachine, Stimulus};

/// Snapshot of both switch levels (`true` = high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LidLevels {
    pub internal: bool,
    pub external: bool,
}

impl LidLevels {
    pub const fn new(internal: bool, external: bool) -> Self {
        Self { internal, external }
    }

    /// The arm action these levels call for.
    pub fn action(self) -> Action {
        match (self.internal, self.external) {
            (false, false) => Action::ArmReset,
            (true, true) => Action::ArmAlarm,
            (false, true) => Action::ArmMotion,
            (true, false) => Action::ArmOff,
        }
    }
}

/// Which switch produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchLine {
    Internal,
    External,
}

/// One level change on one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchEdge {
    pub line: SwitchLine,
    pub level: bool,
}

struct Sampler<S> {
    sensor: S,
    last: LidLevels,
}

/// Serialises switch sampling and turns level changes into stimuli.
///
/// Shared between the edge-watch thread and the orchestrator.
pub struct LidMonitor<S> {
    sampler: Mutex<Sampler<S>>,
    movement: AtomicU8,
    overrun: Duration,
}

impl<S: SwitchSensor> LidMonitor<S> {
    /// `overrun` is the settling delay applied before sampling while the
    /// arm is moving forward.
    pub fn new(sensor: S, overrun: Duration) -> Self {
        Self {
            sampler: Mutex::new(Sampler {
                sensor,
                last: LidLevels::default(),
            }),
            movement: AtomicU8::new(ArmMovement::Idle as u8),
            overrun,
        }
    }

    /// Record what the arm was last told to do.
    pub fn set_movement(&self, movement: ArmMovement) {
        self.movement.store(movement as u8, Ordering::Release);
    }

    pub fn movement(&self) -> ArmMovement {
        ArmMovement::from_raw(self.movement.load(Ordering::Acquire))
    }

    /// Levels as of the last sample that changed them.
    pub fn last_levels(&self) -> LidLevels {
        self.sampler.lock().last
    }

    /// Read both switches and stimulate the machine if the levels differ
    /// from the previous sample.
    ///
    /// While the arm moves forward the read is delayed by the overrun so a
    /// toggle that is still flipping is not caught halfway.
    pub fn sample(&self, fsm: &StateMachine) -> Result<Option<Stimulus>, SensorError> {
        let mut sampler = self.sampler.lock();

        if self.movement() == ArmMovement::Forward && !self.overrun.is_zero() {
            thread::sleep(self.overrun);
        }

        let levels = sampler.sensor.read()?;
        if levels == sampler.last {
            debug!(
                "Lid: unchanged (int={}, ext={})",
                levels.internal, levels.external
            );
            return Ok(None);
        }

        sampler.last = levels;
        let action = levels.action();
        info!(
            "Lid: int={} ext={} -> {action}",
            levels.internal, levels.external
        );
        Ok(Some(fsm.stimulate(action)))
    }

    /// Consume edge events until the machine reaches `Shutdown` or the
    /// edge source disconnects.  Every `poll` without an edge the sensor
    /// gets a chance to detect changes itself, and the machine is checked
    /// for shutdown.
    pub fn watch(&self, edges: &Receiver<SwitchEdge>, fsm: &StateMachine, poll: Duration) {
        info!("Lid: watching switch edges");
        loop {
            match edges.recv_timeout(poll) {
                Ok(edge) => {
                    debug!("Lid: {:?} edge -> {}", edge.line, u8::from(edge.level));
                    if let Err(e) = self.sample(fsm) {
                        warn!("Lid: sample failed: {e}");
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(e) = self.sampler.lock().sensor.poll() {
                        warn!("Lid: poll failed: {e}");
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Lid: edge source closed");
                    break;
                }
            }
            if fsm.current_state().is_terminal() {
                break;
            }
        }
        debug!("Lid: watcher exiting");
    }
}
