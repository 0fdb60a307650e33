//! Finger arm motor driver (H-bridge).
//!
//! Three digital outputs: an enable line and two direction inputs.
//!
//! | Command  | IN1  | IN2  | EN   |
//! |----------|------|------|------|
//! | forward  | LOW  | HIGH | HIGH |
//! | backward | HIGH | LOW  | HIGH |
//! | stop     |  –   |  –   | LOW  |
//!
//! This driver is a dumb actuator.  Deciding whether a move is allowed
//! (e.g. not pulling back while the internal switch is pressed) is the
//! orchestrator's job.

use embedded_hal::digital::OutputPin;
use log::info;

use crate::error::ActuatorError;

/// What the motor is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ArmMovement {
    #[default]
    Idle = 0,
    Forward = 1,
    Backward = 2,
}

impl ArmMovement {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Forward,
            2 => Self::Backward,
            _ => Self::Idle,
        }
    }
}

pub struct ArmMotor<EN, IN1, IN2> {
    en: EN,
    in1: IN1,
    in2: IN2,
    movement: ArmMovement,
}

impl<EN, IN1, IN2> ArmMotor<EN, IN1, IN2>
where
    EN: OutputPin,
    IN1: OutputPin,
    IN2: OutputPin,
{
    /// Take ownership of the pins and make sure the motor is off.
    pub fn new(en: EN, in1: IN1, in2: IN2) -> Result<Self, ActuatorError> {
        let mut motor = Self {
            en,
            in1,
            in2,
            movement: ArmMovement::Idle,
        };
        motor.stop()?;
        Ok(motor)
    }

    pub fn forward(&mut self) -> Result<(), ActuatorError> {
        info!("Arm: forward");
        self.in1.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.in2.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.en.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.movement = ArmMovement::Forward;
        Ok(())
    }

    pub fn backward(&mut self) -> Result<(), ActuatorError> {
        info!("Arm: backward");
        self.in1.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.in2.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.en.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.movement = ArmMovement::Backward;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        info!("Arm: stop");
        self.en.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.movement = ArmMovement::Idle;
        Ok(())
    }

    pub fn movement(&self) -> ArmMovement {
        self.movement
    }

    pub fn is_moving(&self) -> bool {
        self.movement != ArmMovement::Idle
    }
}
