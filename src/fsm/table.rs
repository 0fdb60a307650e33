//! The prop's behavioural policy as a pure transition function.
//!
//! ```text
//!  POWERUP ──▶ IDLE ◀──▶ ALARMING ◀──▶ RESETTING ──[motion]──▶ SCARE_SETUP
//!                                                                  │
//!        ┌──────────── SCARE1 ◀──▶ SCARE2 ──▶ OFFENCE ◀────────────┘
//!        ▼                                       │
//!     SCARE3 ──[off]──▶ SUSPICION_SETUP ──▶ S1 ──▶ S2 ──▶ S3
//!                              │  [exit]                  │
//!                              ▼                          ▼
//!                        SLOW_FINGER_2 ◀── SLOW_FINGER_SETUP ◀──▶ SLOW_FINGER_1
//!                              │
//!                              └──[off]──▶ TIMEOUT_THEN_RESET ──[timeout]──▶ RESETTING
//!
//!  Any state ──[shutdown]──▶ BEFORE_SHUTDOWN ──[shutdown done]──▶ SHUTDOWN
//! ```
//!
//! Every state lists the actions it accepts; a pair that is not listed has
//! no entry and the engine rejects it.  Self-loops are listed explicitly so
//! that stale timer stimuli are absorbed rather than rejected.

use super::{Action, State};

/// Look up the successor of `state` under `action`.
///
/// Returns `None` when the pair has no entry.
pub fn next_state(state: State, action: Action) -> Option<State> {
    use Action as A;
    use State as S;

    // Shutdown requests are accepted everywhere outside the shutdown pair.
    if matches!(action, A::Shutdown | A::ShutdownDone)
        && !matches!(state, S::BeforeShutdown | S::Shutdown)
    {
        return Some(S::BeforeShutdown);
    }

    let next = match (state, action) {
        (S::Idle, A::Next | A::ArmOff | A::Timeout) => S::Idle,
        (S::Idle, A::ArmAlarm | A::ArmMotion) => S::Alarming,
        (S::Idle, A::ArmReset) => S::Resetting,

        (S::Powerup, A::Next | A::Timeout) => S::Powerup,
        (S::Powerup, A::ArmOff) => S::Idle,
        (S::Powerup, A::ArmAlarm | A::ArmMotion) => S::Alarming,
        (S::Powerup, A::ArmReset) => S::Resetting,

        (S::Alarming, A::Next | A::ArmAlarm | A::ArmMotion | A::Timeout) => S::Alarming,
        (S::Alarming, A::ArmOff) => S::Idle,
        (S::Alarming, A::ArmReset) => S::Resetting,

        (S::Resetting, A::Next | A::ArmReset | A::Timeout) => S::Resetting,
        (S::Resetting, A::ArmOff) => S::Idle,
        (S::Resetting, A::ArmAlarm) => S::Alarming,
        (S::Resetting, A::ArmMotion) => S::ScareSetup,

        (S::ScareSetup, A::Next | A::ArmReset | A::ArmMotion) => S::ScareSetup,
        (S::ScareSetup, A::ScareExit) => S::ResettingRetry,
        (S::ScareSetup, A::ArmAlarm | A::ArmOff) => S::Scare1,

        (S::Scare1, A::Next | A::ArmAlarm | A::ArmMotion) => S::Scare1,
        (S::Scare1, A::ScareExit) => S::Scare3,
        (S::Scare1, A::ScareTimeout | A::ArmReset | A::ArmOff) => S::Scare2,

        (S::Scare2, A::ArmMotion) => S::Scare2,
        (S::Scare2, A::ScareExit) => S::Scare3,
        (S::Scare2, A::ScareTimeout | A::ArmAlarm) => S::Scare1,
        (S::Scare2, A::Next | A::ArmReset | A::ArmOff) => S::Offence,

        (
            S::Scare3,
            A::ScareExit | A::Next | A::ScareTimeout | A::ArmAlarm | A::ArmMotion,
        ) => S::Scare3,
        (S::Scare3, A::ArmReset) => S::ResettingRetry,
        (S::Scare3, A::ArmOff) => S::SuspicionSetup,

        (S::TimeoutThenReset, A::Next | A::ArmReset | A::ArmOff) => S::TimeoutThenReset,
        (S::TimeoutThenReset, A::Timeout) => S::Resetting,
        (S::TimeoutThenReset, A::ArmAlarm | A::ArmMotion) => S::ScareSetup,

        (S::ResettingRetry, A::Next | A::ArmReset | A::Timeout | A::ArmMotion) => {
            S::ResettingRetry
        }
        (S::ResettingRetry, A::ArmOff) => S::SuspicionSetup,
        (S::ResettingRetry, A::ArmAlarm) => S::Offence,

        (S::Offence, A::Next | A::ArmAlarm | A::ArmMotion | A::ArmOff | A::Timeout) => {
            S::Offence
        }
        (S::Offence, A::ArmReset) => S::TimeoutThenReset,

        // The three suspicion steps share their exits and differ only in
        // where the peek timer leads.
        (
            S::SuspicionSetup | S::Suspicion1 | S::Suspicion2,
            A::Next | A::ArmOff | A::ArmReset,
        ) => state,
        (S::SuspicionSetup, A::SuspicionTimeout) => S::Suspicion1,
        (S::Suspicion1, A::SuspicionTimeout) => S::Suspicion2,
        (S::Suspicion2, A::SuspicionTimeout) => S::Suspicion3,

        (S::Suspicion3, A::Next | A::ArmReset | A::SuspicionTimeout) => S::Suspicion3,
        (S::Suspicion3, A::ArmOff) => S::SuspicionSetup,

        (
            S::SuspicionSetup | S::Suspicion1 | S::Suspicion2 | S::Suspicion3,
            A::SuspicionExit,
        ) => S::SlowFinger2,
        (
            S::SuspicionSetup | S::Suspicion1 | S::Suspicion2 | S::Suspicion3,
            A::ArmAlarm | A::ArmMotion,
        ) => S::SlowFingerSetup,

        (
            S::SlowFingerSetup | S::SlowFinger1,
            A::Next | A::ArmAlarm | A::ArmMotion | A::ArmOff,
        ) => state,
        (S::SlowFingerSetup, A::SlowfingerTimeout) => S::SlowFinger1,
        (S::SlowFinger1, A::SlowfingerTimeout) => S::SlowFingerSetup,
        (S::SlowFingerSetup | S::SlowFinger1, A::ArmReset) => S::SlowFinger2,

        (S::SlowFinger2, A::Next | A::ArmReset | A::SlowfingerTimeout) => S::SlowFinger2,
        (S::SlowFinger2, A::ArmAlarm | A::ArmMotion) => S::ScareSetup,
        (S::SlowFinger2, A::ArmOff) => S::TimeoutThenReset,

        (S::BeforeShutdown, A::ShutdownDone) => S::Shutdown,
        (
            S::BeforeShutdown,
            A::Next
            | A::ArmReset
            | A::ArmAlarm
            | A::ArmMotion
            | A::ArmOff
            | A::Shutdown
            | A::Timeout,
        ) => S::BeforeShutdown,

        (S::Shutdown, _) => S::Shutdown,

        _ => return None,
    };

    Some(next)
}
