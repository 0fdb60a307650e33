//! Mock hardware adapters for integration tests.
//!
//! Every mock is a cheap handle over shared state: clone one, hand the
//! clone to the service, keep the original to inspect the full command
//! history or to flip switches from the test thread.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use startle::app::events::AppEvent;
use startle::app::lid::{LidLevels, SwitchEdge, SwitchLine};
use startle::app::ports::{ArmActuator, EventSink, SwitchSensor};
use startle::config::PropConfig;
use startle::error::{ActuatorError, SensorError};
use startle::fsm::{Action, State, StateMachine};

// ── Arm call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmCall {
    Stop,
    Forward,
    Backward,
}

// ── MockArm ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockArm {
    calls: Arc<Mutex<Vec<ArmCall>>>,
    fail: Arc<Mutex<bool>>,
}

#[allow(dead_code)]
impl MockArm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ArmCall> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<ArmCall> {
        self.calls.lock().last().copied()
    }

    pub fn count(&self, call: ArmCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Make every subsequent command fail.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    fn record(&mut self, call: ArmCall) -> Result<(), ActuatorError> {
        if *self.fail.lock() {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl ArmActuator for MockArm {
    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.record(ArmCall::Stop)
    }

    fn forward(&mut self) -> Result<(), ActuatorError> {
        self.record(ArmCall::Forward)
    }

    fn backward(&mut self) -> Result<(), ActuatorError> {
        self.record(ArmCall::Backward)
    }
}

// ── MockLid ───────────────────────────────────────────────────

struct LidState {
    levels: LidLevels,
    reads: usize,
    fail: bool,
}

/// Switch pair whose levels the test sets directly.
#[derive(Clone)]
pub struct MockLid {
    state: Arc<Mutex<LidState>>,
    tx: Sender<SwitchEdge>,
    rx: Arc<Mutex<Option<Receiver<SwitchEdge>>>>,
}

#[allow(dead_code)]
impl MockLid {
    pub fn new(levels: LidLevels) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: Arc::new(Mutex::new(LidState {
                levels,
                reads: 0,
                fail: false,
            })),
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
        }
    }

    /// Change the levels and raise one edge per changed line.
    pub fn set(&self, levels: LidLevels) {
        let prev = {
            let mut st = self.state.lock();
            std::mem::replace(&mut st.levels, levels)
        };
        if prev.internal != levels.internal {
            let _ = self.tx.send(SwitchEdge {
                line: SwitchLine::Internal,
                level: levels.internal,
            });
        }
        if prev.external != levels.external {
            let _ = self.tx.send(SwitchEdge {
                line: SwitchLine::External,
                level: levels.external,
            });
        }
    }

    pub fn reads(&self) -> usize {
        self.state.lock().reads
    }

    pub fn set_failing(&self, fail: bool) {
        self.state.lock().fail = fail;
    }
}

impl SwitchSensor for MockLid {
    fn read(&mut self) -> Result<LidLevels, SensorError> {
        let mut st = self.state.lock();
        st.reads += 1;
        if st.fail {
            return Err(SensorError::GpioReadFailed);
        }
        Ok(st.levels)
    }

    fn edges(&mut self) -> Option<Receiver<SwitchEdge>> {
        self.rx.lock().take()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().clone()
    }

    pub fn entered(&self) -> Vec<State> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateEntered(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn timers(&self) -> Vec<(Action, Duration)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                AppEvent::TimerArmed { action, delay } => Some((*action, *delay)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().push(event.clone());
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub const WAIT: Duration = Duration::from_secs(5);

/// Short timings so behaviour sequences complete in milliseconds.
pub fn fast_config() -> PropConfig {
    PropConfig {
        scare_exit_ms: 300,
        scare_step_ms: 40,
        timeout_reset_ms: 100,
        suspicion_exit_ms: 600,
        suspicion_peek_min_ms: 20,
        suspicion_peek_max_ms: 60,
        suspicion_open_min_ms: 10,
        suspicion_open_max_ms: 30,
        suspicion_hold_min_ms: 20,
        suspicion_hold_max_ms: 40,
        slow_finger_on_ms: 20,
        slow_finger_off_ms: 20,
        forward_overrun_ms: 5,
        edge_poll_ms: 10,
        timer_capacity: 16,
    }
}

/// Poll until `pred` holds or `timeout` passes.
pub fn eventually(timeout: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    pred()
}

/// Poll until the machine is in `state`.
pub fn wait_for_state(fsm: &StateMachine, state: State) -> bool {
    eventually(WAIT, || fsm.current_state() == state)
}
