//! Application core: the prop's behaviour, free of direct I/O.
//!
//! The orchestrator turns observed states into arm moves and timers, the
//! lid monitor turns switch levels into stimuli, and the service wires
//! both to the engine.  Hardware is reached only through the **port
//! traits** in [`ports`], so all of it runs against test doubles.

pub mod events;
pub mod lid;
pub mod orchestrator;
pub mod ports;
pub mod service;
