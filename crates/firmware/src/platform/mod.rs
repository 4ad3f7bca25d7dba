//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the microcontroller pins
//! and PWM channels the line follower drives. All platform-specific code
//! must be isolated to this module.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{GpioError, PlatformError, PwmError, Result};
pub use traits::{GpioInterface, GpioMode, PwmInterface};
