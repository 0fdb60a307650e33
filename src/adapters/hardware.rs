//! Hardware adapters bridging the GPIO drivers to the domain ports.
//!
//! The arm and the lid switches end up on different threads, so each
//! gets its own adapter instead of one struct owning everything.  Both
//! are generic over `embedded-hal` pins: real GPIO on the board, or
//! [`SimLine`](super::sim::SimLine)s on the host.

use std::sync::mpsc::Receiver;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::lid::{LidLevels, SwitchEdge};
use crate::app::ports::{ArmActuator, SwitchSensor};
use crate::drivers::arm_motor::{ArmMotor, ArmMovement};
use crate::error::{ActuatorError, SensorError};
use crate::sensors::lid_switch::LidSwitches;

/// [`ArmActuator`] over the H-bridge driver.
pub struct HardwareArm<EN, IN1, IN2> {
    motor: ArmMotor<EN, IN1, IN2>,
}

impl<EN, IN1, IN2> HardwareArm<EN, IN1, IN2>
where
    EN: OutputPin,
    IN1: OutputPin,
    IN2: OutputPin,
{
    pub fn new(motor: ArmMotor<EN, IN1, IN2>) -> Self {
        Self { motor }
    }

    pub fn movement(&self) -> ArmMovement {
        self.motor.movement()
    }
}

// ── ArmActuator implementation ────────────────────────────────

impl<EN, IN1, IN2> ArmActuator for HardwareArm<EN, IN1, IN2>
where
    EN: OutputPin + Send,
    IN1: OutputPin + Send,
    IN2: OutputPin + Send,
{
    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.motor.stop()
    }

    fn forward(&mut self) -> Result<(), ActuatorError> {
        self.motor.forward()
    }

    fn backward(&mut self) -> Result<(), ActuatorError> {
        self.motor.backward()
    }
}

/// [`SwitchSensor`] over the lid switch pair.
pub struct HardwareLid<I, E> {
    switches: LidSwitches<I, E>,
}

impl<I: InputPin, E: InputPin> HardwareLid<I, E> {
    pub fn new(switches: LidSwitches<I, E>) -> Self {
        Self { switches }
    }
}

// ── SwitchSensor implementation ───────────────────────────────

impl<I, E> SwitchSensor for HardwareLid<I, E>
where
    I: InputPin + Send,
    E: InputPin + Send,
{
    fn read(&mut self) -> Result<LidLevels, SensorError> {
        self.switches.read()
    }

    fn edges(&mut self) -> Option<Receiver<SwitchEdge>> {
        self.switches.take_edges()
    }

    /// Software edge detection, for pins wired without interrupts.
    fn poll(&mut self) -> Result<(), SensorError> {
        self.switches.poll_edges().map(|_| ())
    }
}
