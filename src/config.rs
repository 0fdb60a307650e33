//! Behaviour timing configuration
//!
//! Every tunable duration of the prop, in milliseconds.  Defaults match the
//! shipped behaviour; a JSON file can override any subset of fields.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::random::DurationRange;
use crate::scheduler::MAX_TIMERS;

/// Core prop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropConfig {
    // --- Scare ---
    /// Time allowed for the whole scare sequence before it gives up
    pub scare_exit_ms: u64,
    /// Duration of each scare vibration step
    pub scare_step_ms: u64,

    // --- Offence recovery ---
    /// Pause before the arm resets after an offence
    pub timeout_reset_ms: u64,

    // --- Suspicion ---
    /// Time spent in suspicion before falling through to slow finger
    pub suspicion_exit_ms: u64,
    /// Wait before a peek starts
    pub suspicion_peek_min_ms: u64,
    pub suspicion_peek_max_ms: u64,
    /// Time the lid is being pushed open
    pub suspicion_open_min_ms: u64,
    pub suspicion_open_max_ms: u64,
    /// Time the lid is held open
    pub suspicion_hold_min_ms: u64,
    pub suspicion_hold_max_ms: u64,

    // --- Slow finger ---
    /// Motor on-time per creep pulse
    pub slow_finger_on_ms: u64,
    /// Motor off-time per creep pulse
    pub slow_finger_off_ms: u64,

    // --- Sampling ---
    /// Settling delay before sampling switches while the arm moves forward
    pub forward_overrun_ms: u64,
    /// How often the edge watcher re-checks for shutdown when idle
    pub edge_poll_ms: u64,

    // --- Resources ---
    /// Maximum outstanding timers
    pub timer_capacity: usize,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            // Scare
            scare_exit_ms: 3_000,
            scare_step_ms: 500,

            // Offence recovery
            timeout_reset_ms: 10_000,

            // Suspicion
            suspicion_exit_ms: 45_000,
            suspicion_peek_min_ms: 1_000,
            suspicion_peek_max_ms: 12_000,
            suspicion_open_min_ms: 400,
            suspicion_open_max_ms: 600,
            suspicion_hold_min_ms: 1_000,
            suspicion_hold_max_ms: 3_000,

            // Slow finger
            slow_finger_on_ms: 100,
            slow_finger_off_ms: 100,

            // Sampling
            forward_overrun_ms: 200,
            edge_poll_ms: 100,

            // Resources
            timer_capacity: 16,
        }
    }
}

impl PropConfig {
    /// Load a JSON file.  Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject ranges with `min > max` and resource limits that cannot work.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, range) in [
            ("suspicion_peek", self.suspicion_peek()),
            ("suspicion_open", self.suspicion_open()),
            ("suspicion_hold", self.suspicion_hold()),
        ] {
            if !range.is_valid() {
                return Err(Error::Config(format!(
                    "{name}: min {} > max {}",
                    range.min_ms, range.max_ms
                )));
            }
        }
        if self.timer_capacity == 0 || self.timer_capacity > MAX_TIMERS {
            return Err(Error::Config(format!(
                "timer_capacity must be in 1..={MAX_TIMERS}, got {}",
                self.timer_capacity
            )));
        }
        if self.edge_poll_ms == 0 {
            return Err(Error::Config("edge_poll_ms must be non-zero".into()));
        }
        Ok(())
    }

    pub fn suspicion_peek(&self) -> DurationRange {
        DurationRange::new(self.suspicion_peek_min_ms, self.suspicion_peek_max_ms)
    }

    pub fn suspicion_open(&self) -> DurationRange {
        DurationRange::new(self.suspicion_open_min_ms, self.suspicion_open_max_ms)
    }

    pub fn suspicion_hold(&self) -> DurationRange {
        DurationRange::new(self.suspicion_hold_min_ms, self.suspicion_hold_max_ms)
    }

    pub fn forward_overrun(&self) -> Duration {
        Duration::from_millis(self.forward_overrun_ms)
    }

    pub fn edge_poll(&self) -> Duration {
        Duration::from_millis(self.edge_poll_ms)
    }
}
