//! Lid switch pair: the internal "arm home" switch and the external lid
//! toggle.
//!
//! Both are plain digital inputs.  Edges reach the domain through a
//! channel: a GPIO interrupt callback holds an [`EdgeNotifier`] and pushes
//! into it, or, on boards without interrupt support,
//! [`LidSwitches::poll_edges`] detects changes in software.

use std::sync::mpsc::{self, Receiver, Sender};

use embedded_hal::digital::InputPin;
use log::debug;

use crate::app::lid::{LidLevels, SwitchEdge, SwitchLine};
use crate::error::SensorError;

/// Sending half of the edge channel.  Cheap to clone into interrupt
/// callbacks.
#[derive(Clone)]
pub struct EdgeNotifier {
    tx: Sender<SwitchEdge>,
}

impl EdgeNotifier {
    /// Report a level change.  Returns `false` once nobody is listening.
    pub fn notify(&self, line: SwitchLine, level: bool) -> bool {
        self.tx.send(SwitchEdge { line, level }).is_ok()
    }
}

pub struct LidSwitches<I, E> {
    internal: I,
    external: E,
    notifier: EdgeNotifier,
    edges: Option<Receiver<SwitchEdge>>,
    polled: Option<LidLevels>,
}

impl<I: InputPin, E: InputPin> LidSwitches<I, E> {
    pub fn new(internal: I, external: E) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            internal,
            external,
            notifier: EdgeNotifier { tx },
            edges: Some(rx),
            polled: None,
        }
    }

    pub fn read(&mut self) -> Result<LidLevels, SensorError> {
        let internal = self
            .internal
            .is_high()
            .map_err(|_| SensorError::GpioReadFailed)?;
        let external = self
            .external
            .is_high()
            .map_err(|_| SensorError::GpioReadFailed)?;
        Ok(LidLevels { internal, external })
    }

    /// Handle for interrupt callbacks.
    pub fn notifier(&self) -> EdgeNotifier {
        self.notifier.clone()
    }

    /// Take the receiving end of the edge channel (once).
    pub fn take_edges(&mut self) -> Option<Receiver<SwitchEdge>> {
        self.edges.take()
    }

    /// Software edge detection: read both lines and emit an edge for each
    /// one that changed since the previous poll.  The first poll only
    /// records the baseline.  Returns the number of edges emitted.
    pub fn poll_edges(&mut self) -> Result<usize, SensorError> {
        let now = self.read()?;
        let Some(prev) = self.polled.replace(now) else {
            return Ok(0);
        };

        let mut emitted = 0;
        if now.internal != prev.internal && self.notifier.notify(SwitchLine::Internal, now.internal)
        {
            emitted += 1;
        }
        if now.external != prev.external && self.notifier.notify(SwitchLine::External, now.external)
        {
            emitted += 1;
        }
        if emitted > 0 {
            debug!("LidSwitches: {emitted} edge(s) polled");
        }
        Ok(emitted)
    }
}
