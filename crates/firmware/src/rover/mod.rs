//! Line follower vehicle
//!
//! Wires the control core to concrete hardware and runs the cooperative
//! control loop.

pub mod line_follower;
pub mod telemetry;

pub use line_follower::{ControlError, Hardware, LineFollower};
pub use telemetry::{Telemetry, TimedTransition, TRANSITION_HISTORY};
