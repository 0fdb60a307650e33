//! Behaviour orchestrator: the single consumer of state changes.
//!
//! Registers as an observer, sleeps in
//! [`wait_state_change`](crate::fsm::StateMachine::wait_state_change) and,
//! for every state it wakes up in, drives the arm and arms the timers that
//! move the behaviour along.  It never decides transitions itself; it only
//! feeds actions back into the engine.
//!
//! ```text
//!  StateMachine ──wait──▶ ┌──────────────┐ ──▶ ArmActuator
//!        ▲                │ Orchestrator │ ──▶ TimerQueue ──┐
//!        └────stimulate───└──────────────┘ ──▶ EventSink    │
//!        ▲                                                  │
//!        └───────────────────on_timer_fired─────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::PropConfig;
use crate::drivers::arm_motor::ArmMovement;
use crate::error::{Error, FsmError};
use crate::fsm::{Action, ObserverId, State, StateMachine};
use crate::scheduler::TimerQueue;

use super::events::AppEvent;
use super::lid::LidMonitor;
use super::ports::{ArmActuator, EventSink, SwitchSensor};

pub struct Orchestrator<A, S, E> {
    fsm: Arc<StateMachine>,
    timers: TimerQueue,
    lid: Arc<LidMonitor<S>>,
    arm: A,
    sink: E,
    config: PropConfig,
    rng: StdRng,
    id: ObserverId,
}

impl<A, S, E> Orchestrator<A, S, E>
where
    A: ArmActuator,
    S: SwitchSensor,
    E: EventSink,
{
    /// Build the orchestrator and register it with the engine.
    ///
    /// Registration happens here rather than in [`run`](Self::run) so the
    /// caller knows the observer exists before the loop thread starts.
    pub fn new(
        fsm: Arc<StateMachine>,
        timers: TimerQueue,
        lid: Arc<LidMonitor<S>>,
        arm: A,
        sink: E,
        config: PropConfig,
    ) -> Result<Self, FsmError> {
        let id = fsm.register()?;
        Ok(Self {
            fsm,
            timers,
            lid,
            arm,
            sink,
            config,
            rng: StdRng::from_entropy(),
            id,
        })
    }

    /// Replace the random source (deterministic runs in tests).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Loop until the engine reaches `Shutdown`, then deregister.
    ///
    /// Returns the arm actuator and sink so callers can inspect them.
    pub fn run(mut self) -> Result<(A, E), Error> {
        self.sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("Orchestrator: running as observer {}", self.id);

        loop {
            let state = self.fsm.wait_state_change(self.id)?;
            debug!("Orchestrator: woke in {state}");
            self.sink.emit(&AppEvent::StateEntered(state));

            if state.is_terminal() {
                break;
            }
            if let Err(e) = self.enter(state) {
                warn!("Orchestrator: {state} side effects failed: {e}");
                self.sink.emit(&AppEvent::HardwareFault(state));
            }
        }

        self.fsm.deregister(self.id)?;
        self.sink.emit(&AppEvent::Stopped);
        info!("Orchestrator: stopped");
        Ok((self.arm, self.sink))
    }

    /// Apply the side effects of entering `state`.
    fn enter(&mut self, state: State) -> Result<(), Error> {
        let cfg = &self.config;
        let ms = Duration::from_millis;
        let scare_exit = ms(cfg.scare_exit_ms);
        let scare_step = ms(cfg.scare_step_ms);
        let timeout_reset = ms(cfg.timeout_reset_ms);
        let suspicion_exit = ms(cfg.suspicion_exit_ms);
        let slow_on = ms(cfg.slow_finger_on_ms);
        let slow_off = ms(cfg.slow_finger_off_ms);

        match state {
            State::Idle => self.stop()?,
            State::Powerup => {
                self.lid.sample(&self.fsm)?;
            }
            State::Alarming => self.forward()?,
            State::Resetting => self.backward()?,

            // ── Scare ──
            State::ScareSetup => {
                self.arm_timer(scare_exit, Action::ScareExit);
                if self.lid.last_levels().internal {
                    self.forward()?;
                } else {
                    self.backward()?;
                }
            }
            State::Scare1 => {
                self.arm_timer(scare_step, Action::ScareTimeout);
                self.forward()?;
            }
            State::Scare2 => {
                self.arm_timer(scare_step, Action::ScareTimeout);
                self.backward()?;
            }
            State::Scare3 => self.forward()?,

            State::TimeoutThenReset => {
                self.arm_timer(timeout_reset, Action::Timeout);
                self.stop()?;
            }
            State::ResettingRetry => self.backward()?,
            State::Offence => self.forward()?,

            // ── Suspicion ──
            State::SuspicionSetup => {
                self.arm_timer(suspicion_exit, Action::SuspicionExit);
                let peek = self.config.suspicion_peek().sample(&mut self.rng);
                self.arm_timer(peek, Action::SuspicionTimeout);
                self.stop()?;
            }
            State::Suspicion1 => {
                let open = self.config.suspicion_open().sample(&mut self.rng);
                self.arm_timer(open, Action::SuspicionTimeout);
                self.forward()?;
            }
            State::Suspicion2 => {
                let hold = self.config.suspicion_hold().sample(&mut self.rng);
                self.arm_timer(hold, Action::SuspicionTimeout);
                self.stop()?;
            }
            State::Suspicion3 => self.backward()?,

            // ── Slow finger ──
            State::SlowFingerSetup => {
                self.arm_timer(slow_on, Action::SlowfingerTimeout);
                self.forward()?;
            }
            State::SlowFinger1 => {
                self.arm_timer(slow_off, Action::SlowfingerTimeout);
                self.stop()?;
            }
            State::SlowFinger2 => self.backward()?,

            State::BeforeShutdown => {
                let stopped = self.stop();
                self.stimulate(Action::ShutdownDone);
                stopped?;
            }
            State::Shutdown => {}
        }
        Ok(())
    }

    // ── Arm commands ──────────────────────────────────────────

    fn stop(&mut self) -> Result<(), Error> {
        self.arm.stop()?;
        self.lid.set_movement(ArmMovement::Idle);
        Ok(())
    }

    fn forward(&mut self) -> Result<(), Error> {
        self.arm.forward()?;
        self.lid.set_movement(ArmMovement::Forward);
        Ok(())
    }

    /// Pull the arm back unless the internal switch already reads pressed,
    /// in which case report the resting position instead of moving.
    fn backward(&mut self) -> Result<(), Error> {
        let levels = self.lid.last_levels();
        if levels.internal {
            info!("Orchestrator: backward skipped, arm already home");
            let action = if levels.external {
                Action::ArmAlarm
            } else {
                Action::ArmOff
            };
            self.stimulate(action);
            return Ok(());
        }
        self.arm.backward()?;
        self.lid.set_movement(ArmMovement::Backward);
        Ok(())
    }

    // ── Engine / timer helpers ────────────────────────────────

    fn stimulate(&mut self, action: Action) {
        let outcome = self.fsm.stimulate(action);
        if let Some(FsmError::InvalidAction { state, action }) = outcome.rejected {
            self.sink.emit(&AppEvent::StimulusRejected { state, action });
        }
    }

    fn arm_timer(&mut self, delay: Duration, action: Action) {
        match self.timers.schedule(delay, action) {
            Ok(id) => {
                debug!("Orchestrator: {id} -> {action} in {}ms", delay.as_millis());
                self.sink.emit(&AppEvent::TimerArmed { action, delay });
            }
            Err(e) => warn!("Orchestrator: could not arm {action}: {e}"),
        }
    }
}
