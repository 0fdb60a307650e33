//! State machine scenarios driven through the public API, plus
//! multi-producer stress.

use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use startle::fsm::table::next_state;
use startle::fsm::{Action, State, StateMachine};

fn powered() -> StateMachine {
    let fsm = StateMachine::new();
    fsm.register().unwrap();
    fsm
}

fn drive(fsm: &StateMachine, steps: &[(Action, State)]) {
    for &(action, expected) in steps {
        let s = fsm.stimulate(action);
        assert!(s.accepted(), "{action} rejected in {}", s.from);
        assert_eq!(s.state, expected, "{action} from {}", s.from);
    }
}

#[test]
fn powerup_off_goes_idle() {
    let fsm = powered();
    drive(&fsm, &[(Action::ArmOff, State::Idle)]);
}

#[test]
fn reset_then_motion_sets_up_scare() {
    let fsm = powered();
    drive(
        &fsm,
        &[
            (Action::ArmOff, State::Idle),
            (Action::ArmReset, State::Resetting),
            (Action::ArmMotion, State::ScareSetup),
        ],
    );
}

#[test]
fn scare_escalates_to_offence() {
    let fsm = powered();
    drive(
        &fsm,
        &[
            (Action::ArmReset, State::Resetting),
            (Action::ArmMotion, State::ScareSetup),
            (Action::ArmAlarm, State::Scare1),
            (Action::ScareTimeout, State::Scare2),
            (Action::ArmOff, State::Offence),
        ],
    );
}

#[test]
fn offence_recovers_after_timeout() {
    let fsm = powered();
    drive(
        &fsm,
        &[
            (Action::ArmReset, State::Resetting),
            (Action::ArmMotion, State::ScareSetup),
            (Action::ScareExit, State::ResettingRetry),
            (Action::ArmAlarm, State::Offence),
            (Action::ArmReset, State::TimeoutThenReset),
            (Action::Timeout, State::Resetting),
        ],
    );
}

#[test]
fn shutdown_state_is_absorbing_and_silent() {
    let fsm = powered();
    drive(
        &fsm,
        &[
            (Action::Shutdown, State::BeforeShutdown),
            (Action::ShutdownDone, State::Shutdown),
        ],
    );
    for action in Action::ALL {
        let s = fsm.stimulate(action);
        assert_eq!(s.state, State::Shutdown);
        assert!(!s.changed());
    }
}

#[test]
fn before_shutdown_only_leaves_on_shutdown_done() {
    let fsm = powered();
    fsm.stimulate(Action::Shutdown);
    for action in Action::ALL {
        if action == Action::ShutdownDone {
            continue;
        }
        let s = fsm.stimulate(action);
        assert_eq!(s.state, State::BeforeShutdown, "{action}");
    }
    assert_eq!(fsm.stimulate(Action::ShutdownDone).state, State::Shutdown);
}

#[test]
fn suspicion_and_slow_finger_loop() {
    let fsm = powered();
    drive(
        &fsm,
        &[
            (Action::ArmReset, State::Resetting),
            (Action::ArmMotion, State::ScareSetup),
            (Action::ScareExit, State::ResettingRetry),
            (Action::ArmOff, State::SuspicionSetup),
            (Action::SuspicionTimeout, State::Suspicion1),
            (Action::SuspicionTimeout, State::Suspicion2),
            (Action::SuspicionTimeout, State::Suspicion3),
            (Action::ArmOff, State::SuspicionSetup),
            (Action::ArmMotion, State::SlowFingerSetup),
            (Action::SlowfingerTimeout, State::SlowFinger1),
            (Action::SlowfingerTimeout, State::SlowFingerSetup),
            (Action::ArmReset, State::SlowFinger2),
            (Action::ArmAlarm, State::ScareSetup),
        ],
    );
}

#[test]
fn concurrent_producers_apply_as_one_sequence() {
    let fsm = Arc::new(powered());
    let handles: Vec<_> = (0..8u64)
        .map(|seed| {
            let fsm = Arc::clone(&fsm);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut moves = Vec::new();
                for _ in 0..500 {
                    // Leave the shutdown pair out so the machine stays live.
                    let action = loop {
                        let a = Action::ALL[rng.gen_range(0..Action::COUNT)];
                        if !matches!(a, Action::Shutdown | Action::ShutdownDone) {
                            break a;
                        }
                    };
                    let s = fsm.stimulate(action);
                    match next_state(s.from, action) {
                        Some(next) => assert_eq!(s.state, next),
                        None => assert_eq!(s.state, s.from),
                    }
                    if s.changed() {
                        moves.push((s.from, s.state));
                    }
                }
                moves
            })
        })
        .collect();
    let moves: Vec<(State, State)> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let last = fsm.current_state();
    assert!(!last.is_terminal());
    assert_ne!(last, State::BeforeShutdown);

    // Every real transition must pick up where the previous one left off,
    // so the moves chain from Powerup to the final state: each state is
    // left exactly as often as it is entered, apart from the two ends.
    // Two producers acting on the same stale state would leave it twice.
    let mut balance = [0i64; State::COUNT];
    for &(from, to) in &moves {
        balance[from as usize] += 1;
        balance[to as usize] -= 1;
    }
    let mut expected = [0i64; State::COUNT];
    expected[State::Powerup as usize] += 1;
    expected[last as usize] -= 1;
    assert_eq!(balance, expected);

    // Powerup is never re-entered, so it is left exactly once.
    if last != State::Powerup {
        assert_eq!(moves.iter().filter(|m| m.0 == State::Powerup).count(), 1);
    }
}
