//! PWM interface trait
//!
//! Each H-bridge input of the drive motors is fed by one PWM channel.

use crate::platform::Result;

/// PWM channel with a fractional duty cycle
pub trait PwmInterface {
    /// Set the duty cycle as a fraction (0.0 = off, 1.0 = always on)
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Pwm(PwmError::InvalidDutyCycle)` if
    /// `duty_cycle` is outside [0.0, 1.0].
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()>;

    /// Current duty cycle
    fn duty_cycle(&self) -> f32;
}
