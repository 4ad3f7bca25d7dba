//! Platform interface traits
//!
//! Platform implementations wrap their HAL's pin types behind these traits.

pub mod gpio;
pub mod pwm;

pub use gpio::{GpioInterface, GpioMode};
pub use pwm::PwmInterface;
