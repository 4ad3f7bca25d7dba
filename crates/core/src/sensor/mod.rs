//! Reflectance line sensor array
//!
//! Five infrared reflectance channels are sampled by timing how long each
//! sensor's integrating capacitor takes to discharge after being charged.
//! Darker surfaces reflect less light and therefore discharge more slowly.
//!
//! # Components
//!
//! - [`types`]: Raw samples, configuration and the line error derivation
//! - [`array`]: The simultaneous charge/discharge measurement loop and the
//!   channel and emitter traits
//! - [`error`]: Sensor fault reporting

pub mod array;
pub mod error;
pub mod types;

pub use array::{DischargeChannel, IrEmitter, LineSensorArray};
pub use error::SensorFault;
pub use types::{
    ErrorSource, LineReading, LineSensorConfig, SensorSample, CENTER, CHANNEL_COUNT, LEFT,
    LEFTEST, RIGHT, RIGHTEST,
};
