//! Sensor drivers.

pub mod lid_switch;
