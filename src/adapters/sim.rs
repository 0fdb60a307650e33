//! In-memory GPIO for host runs and tests.
//!
//! [`SimLine`] is a shared digital line implementing both `InputPin` and
//! `OutputPin`; clones observe the same level.  [`SimLid`] drives the two
//! lid switch lines and reports edges like an interrupt would, and
//! [`SimArm`] moves a virtual finger according to the motor lines so the
//! host binary behaves like a real box.

use core::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::debug;

use crate::app::lid::{LidLevels, SwitchLine};
use crate::sensors::lid_switch::{EdgeNotifier, LidSwitches};

// ---------------------------------------------------------------------------
// SimLine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SimLine {
    level: Arc<AtomicBool>,
}

impl SimLine {
    pub fn new(level: bool) -> Self {
        Self {
            level: Arc::new(AtomicBool::new(level)),
        }
    }

    pub fn level(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    /// Set the level, returning the previous one.
    pub fn set(&self, level: bool) -> bool {
        self.level.swap(level, Ordering::AcqRel)
    }
}

impl ErrorType for SimLine {
    type Error = Infallible;
}

impl InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level())
    }
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SimLid
// ---------------------------------------------------------------------------

/// Test-side handle onto a simulated switch pair.
#[derive(Clone)]
pub struct SimLid {
    internal: SimLine,
    external: SimLine,
    notifier: EdgeNotifier,
}

impl SimLid {
    /// Create the switch pair at `levels`, returning the handle and the
    /// driver to hand to the service.
    pub fn new(levels: LidLevels) -> (Self, LidSwitches<SimLine, SimLine>) {
        let internal = SimLine::new(levels.internal);
        let external = SimLine::new(levels.external);
        let switches = LidSwitches::new(internal.clone(), external.clone());
        let lid = Self {
            internal,
            external,
            notifier: switches.notifier(),
        };
        (lid, switches)
    }

    pub fn levels(&self) -> LidLevels {
        LidLevels::new(self.internal.level(), self.external.level())
    }

    pub fn set_internal(&self, level: bool) {
        if self.internal.set(level) != level {
            self.notifier.notify(SwitchLine::Internal, level);
        }
    }

    pub fn set_external(&self, level: bool) {
        if self.external.set(level) != level {
            self.notifier.notify(SwitchLine::External, level);
        }
    }

    pub fn set(&self, levels: LidLevels) {
        self.set_internal(levels.internal);
        self.set_external(levels.external);
    }
}

// ---------------------------------------------------------------------------
// SimArm
// ---------------------------------------------------------------------------

/// Virtual finger driven by the motor lines.
///
/// The finger travels between home (internal switch pressed) and full
/// reach (where it flips the lid toggle back off).
pub struct SimArm {
    en: SimLine,
    in1: SimLine,
    in2: SimLine,
    lid: SimLid,
    position: Duration,
    travel: Duration,
}

impl SimArm {
    /// `travel` is how long the motor takes from home to full reach.
    pub fn new(motor: [SimLine; 3], lid: SimLid, travel: Duration) -> Self {
        let [en, in1, in2] = motor;
        let position = if lid.levels().internal { Duration::ZERO } else { travel };
        Self {
            en,
            in1,
            in2,
            lid,
            position,
            travel,
        }
    }

    /// How far out the finger is, from home.
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Advance the simulation by `dt`.
    pub fn step(&mut self, dt: Duration) {
        if self.en.level() {
            match (self.in1.level(), self.in2.level()) {
                (false, true) => self.position = (self.position + dt).min(self.travel),
                (true, false) => self.position = self.position.saturating_sub(dt),
                _ => {}
            }
        }

        self.lid.set_internal(self.position.is_zero());
        if self.position >= self.travel && self.lid.levels().external {
            debug!("SimArm: finger flipped the lid toggle");
            self.lid.set_external(false);
        }
    }
}
