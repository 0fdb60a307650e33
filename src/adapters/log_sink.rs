//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade, one line per event.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
            AppEvent::StateEntered(state) => {
                info!("STATE | {}", state);
            }
            AppEvent::StimulusRejected { state, action } => {
                warn!("REJECT | {} in {}", action, state);
            }
            AppEvent::TimerArmed { action, delay } => {
                info!("TIMER | {} in {:.3}s", action, delay.as_secs_f32());
            }
            AppEvent::HardwareFault(state) => {
                warn!("FAULT | hardware call failed in {}", state);
            }
            AppEvent::Stopped => {
                info!("STOP | behaviour loop finished");
            }
        }
    }
}
