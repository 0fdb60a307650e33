//! Orchestrator driven directly: real engine and timer queue, mock arm,
//! lid and sink, seeded randomness.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use startle::app::events::AppEvent;
use startle::app::lid::{LidLevels, LidMonitor};
use startle::app::orchestrator::Orchestrator;
use startle::config::PropConfig;
use startle::error::Error;
use startle::fsm::{Action, State, StateMachine};
use startle::scheduler::{TimerQueue, TimerWorker};

use crate::mock_hw::{ArmCall, MockArm, MockLid, RecordingSink, eventually, wait_for_state, WAIT};

type Outcome = Result<(MockArm, RecordingSink), Error>;

struct Rig {
    fsm: Arc<StateMachine>,
    timers: TimerQueue,
    worker: TimerWorker,
    arm: MockArm,
    sink: RecordingSink,
    handle: JoinHandle<Outcome>,
}

impl Rig {
    fn start(config: PropConfig, levels: LidLevels, seed: u64) -> Self {
        let fsm = Arc::new(StateMachine::new());
        let (timers, worker) = TimerQueue::spawn(fsm.clone(), config.timer_capacity).unwrap();
        let lid = Arc::new(LidMonitor::new(MockLid::new(levels), config.forward_overrun()));
        let arm = MockArm::new();
        let sink = RecordingSink::new();

        let orchestrator = Orchestrator::new(
            Arc::clone(&fsm),
            timers.clone(),
            lid,
            arm.clone(),
            sink.clone(),
            config,
        )
        .unwrap()
        .with_rng(StdRng::seed_from_u64(seed));

        let handle = thread::spawn(move || orchestrator.run());
        Self {
            fsm,
            timers,
            worker,
            arm,
            sink,
            handle,
        }
    }

    fn saw(&self, state: State) -> bool {
        eventually(WAIT, || self.sink.entered().contains(&state))
    }

    /// Stimulate and wait until the orchestrator has acted on the result.
    fn step(&self, action: Action, expected: State) {
        let s = self.fsm.stimulate(action);
        assert_eq!(s.state, expected, "{action} from {}", s.from);
        assert!(self.saw(expected), "orchestrator never entered {expected}");
    }

    fn finish(self) -> Outcome {
        self.fsm.stimulate(Action::Shutdown);
        let outcome = self.handle.join().unwrap();
        self.timers.stop();
        self.worker.join();
        outcome
    }
}

/// Walk to `SuspicionSetup` without letting any scare timer matter.
fn to_suspicion(rig: &Rig) {
    rig.step(Action::ArmReset, State::Resetting);
    rig.step(Action::ArmMotion, State::ScareSetup);
    rig.step(Action::ScareExit, State::ResettingRetry);
    rig.step(Action::ArmOff, State::SuspicionSetup);
}

#[test]
fn single_observer_reaches_shutdown_and_deregisters() {
    let rig = Rig::start(PropConfig::default(), LidLevels::new(true, false), 1);
    assert!(wait_for_state(&rig.fsm, State::Idle));
    assert_eq!(rig.fsm.observer_count(), 1);

    let fsm = Arc::clone(&rig.fsm);
    let (arm, sink) = rig.finish().unwrap();

    assert_eq!(fsm.current_state(), State::Shutdown);
    assert_eq!(fsm.observer_count(), 0);
    assert_eq!(arm.last_call(), Some(ArmCall::Stop));
    let events = sink.events();
    assert!(matches!(events.first(), Some(AppEvent::Started(_))));
    assert_eq!(events.last(), Some(&AppEvent::Stopped));
    let entered = sink.entered();
    assert!(entered.contains(&State::BeforeShutdown));
    assert_eq!(entered.last(), Some(&State::Shutdown));
}

#[test]
fn backward_is_skipped_while_arm_is_home() {
    // Both switches high: arm home, lid toggle on.
    let rig = Rig::start(PropConfig::default(), LidLevels::new(true, true), 2);
    assert!(rig.saw(State::Alarming));
    assert!(eventually(WAIT, || rig.arm.count(ArmCall::Forward) == 1));

    // Resetting wants to pull back, but the arm is already home with the
    // toggle on, so it reports ArmAlarm instead.
    rig.fsm.stimulate(Action::ArmReset);
    assert!(eventually(WAIT, || rig.arm.count(ArmCall::Forward) == 2));
    assert_eq!(rig.fsm.current_state(), State::Alarming);
    assert_eq!(rig.arm.count(ArmCall::Backward), 0);

    rig.finish().unwrap();
}

#[test]
fn backward_guard_reports_off_when_toggle_is_off() {
    let rig = Rig::start(PropConfig::default(), LidLevels::new(true, false), 3);
    assert!(rig.saw(State::Idle));

    rig.fsm.stimulate(Action::ArmReset);
    assert!(rig.saw(State::Resetting));
    assert!(wait_for_state(&rig.fsm, State::Idle));
    assert_eq!(rig.arm.count(ArmCall::Backward), 0);

    rig.finish().unwrap();
}

#[test]
fn scare_setup_direction_follows_internal_switch() {
    // Both low: nothing changes at powerup, so drive by hand.
    let rig = Rig::start(PropConfig::default(), LidLevels::new(false, false), 4);
    assert!(rig.saw(State::Powerup));

    rig.step(Action::ArmReset, State::Resetting);
    rig.step(Action::ArmMotion, State::ScareSetup);
    assert!(eventually(WAIT, || rig.arm.count(ArmCall::Backward) == 2));
    assert!(rig
        .sink
        .timers()
        .contains(&(Action::ScareExit, Duration::from_millis(3_000))));

    rig.finish().unwrap();
}

#[test]
fn seeded_runs_draw_identical_peek_delays() {
    let peek_of = |seed| {
        let rig = Rig::start(PropConfig::default(), LidLevels::new(false, false), seed);
        assert!(rig.saw(State::Powerup));
        to_suspicion(&rig);
        assert!(eventually(WAIT, || rig.sink.timers().len() >= 3));
        let (_, sink) = rig.finish().unwrap();
        sink.timers()
            .into_iter()
            .find(|(a, _)| *a == Action::SuspicionTimeout)
            .map(|(_, d)| d)
            .unwrap()
    };

    let a = peek_of(99);
    let b = peek_of(99);
    assert_eq!(a, b);
    assert!(a >= Duration::from_millis(1_000) && a <= Duration::from_millis(12_000));
}

#[test]
fn full_timer_queue_is_logged_not_fatal() {
    let config = PropConfig {
        timer_capacity: 1,
        ..PropConfig::default()
    };
    let rig = Rig::start(config, LidLevels::new(false, false), 5);
    assert!(rig.saw(State::Powerup));
    to_suspicion(&rig);

    // The scare exit timer (3 s) still holds the only slot.
    assert_eq!(rig.timers.pending(), 1);
    assert!(eventually(WAIT, || rig.arm.count(ArmCall::Stop) >= 1));
    assert!(!rig
        .sink
        .timers()
        .iter()
        .any(|(a, _)| matches!(a, Action::SuspicionExit | Action::SuspicionTimeout)));

    rig.finish().unwrap();
}

#[test]
fn failing_arm_still_completes_shutdown() {
    let rig = Rig::start(PropConfig::default(), LidLevels::new(true, false), 6);
    assert!(rig.saw(State::Idle));
    rig.arm.set_failing(true);

    let fsm = Arc::clone(&rig.fsm);
    let (_, sink) = rig.finish().unwrap();
    assert_eq!(fsm.current_state(), State::Shutdown);
    assert!(sink
        .events()
        .contains(&AppEvent::HardwareFault(State::BeforeShutdown)));
}
