//! Actuator drivers.

pub mod arm_motor;
