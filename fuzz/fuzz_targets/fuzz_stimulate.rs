//! Fuzz target: `StateMachine::stimulate`
//!
//! Each input byte is one stimulus.  Bytes outside the action range are
//! treated as a spurious wake of the observer instead.  The engine must
//! never panic, must always land in a known state and must only reach
//! `Shutdown` through `BeforeShutdown`.
//!
//! cargo fuzz run fuzz_stimulate

#![no_main]

use libfuzzer_sys::fuzz_target;
use startle::fsm::table::next_state;
use startle::fsm::{Action, State, StateMachine};

fuzz_target!(|data: &[u8]| {
    let fsm = StateMachine::new();
    let Ok(id) = fsm.register() else {
        return;
    };

    for &byte in data {
        let Some(action) = Action::from_index(byte % 16) else {
            let _ = fsm.cancel_wait(id);
            let _ = fsm.wait_state_change(id);
            continue;
        };

        let s = fsm.stimulate(action);
        assert_eq!(s.accepted(), next_state(s.from, action).is_some());
        assert_eq!(fsm.current_state(), s.state);
        assert!(State::from_index(s.state as u8).is_ok());
        if s.state == State::Shutdown && s.from != State::Shutdown {
            assert_eq!(s.from, State::BeforeShutdown);
            assert_eq!(action, Action::ShutdownDone);
        }
        if s.changed() {
            assert_eq!(fsm.wait_state_change(id), Ok(s.state));
        }
    }

    assert_eq!(fsm.deregister(id), Ok(()));
    assert_eq!(fsm.current_state(), State::Shutdown);
});
