//! Startle prop controller library.
//!
//! A lid-switch driven animatronic: a finger arm answers visitors who flip
//! the box's toggle, escalating through alarm, scare, suspicion and slow
//! creeping behaviours.  The core is a synchronised state machine shared
//! by the switch watcher, the timer queue and the behaviour loop.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod random;
pub mod scheduler;
pub mod sensors;
pub mod shutdown;

pub use error::{Error, Result};
