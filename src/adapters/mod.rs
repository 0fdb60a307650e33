//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                     |
//! |------------|---------------|---------------------------------|
//! | `hardware` | ArmActuator   | H-bridge via `embedded-hal` pins |
//! |            | SwitchSensor  | Lid switches + edge channel     |
//! | `log_sink` | EventSink     | `log` facade                    |
//! | `sim`      | –             | In-memory GPIO and virtual arm  |

pub mod hardware;
pub mod log_sink;
pub mod sim;
