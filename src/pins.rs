//! GPIO pin assignments for the startle prop board.
//!
//! Single source of truth for pin numbers.  Numbering follows the
//! wiringPi scheme used by the prop's Raspberry Pi header.

// ---------------------------------------------------------------------------
// Finger motor driver (L293D-style H-bridge)
// ---------------------------------------------------------------------------

/// Digital output: bridge enable.  LOW stops the motor.
pub const FINGER_MTR_EN: u8 = 0;
/// Digital output: bridge input 1.
pub const FINGER_MTR_IN1: u8 = 1;
/// Digital output: bridge input 2.
pub const FINGER_MTR_IN2: u8 = 2;

// ---------------------------------------------------------------------------
// Lid switches (edge interrupts on both edges)
// ---------------------------------------------------------------------------

/// Digital input: switch inside the box, HIGH while the arm presses it.
pub const BOX_INT_SWITCH: u8 = 3;
/// Digital input: switch on the outside of the box, HIGH while the lid
/// toggle is flipped on.
pub const BOX_EXT_SWITCH: u8 = 4;

/// All pins, for startup logging.
pub const ALL: [(&str, u8); 5] = [
    ("FINGER_MTR_EN", FINGER_MTR_EN),
    ("FINGER_MTR_IN1", FINGER_MTR_IN1),
    ("FINGER_MTR_IN2", FINGER_MTR_IN2),
    ("BOX_INT_SWITCH", BOX_INT_SWITCH),
    ("BOX_EXT_SWITCH", BOX_EXT_SWITCH),
];
