//! Mock PWM implementation for testing

use crate::platform::{error::PwmError, traits::PwmInterface, Result};

/// Mock PWM channel
///
/// Remembers the last duty cycle written. A faulted channel rejects every
/// write.
#[derive(Debug, Default)]
pub struct MockPwm {
    duty_cycle: f32,
    faulted: bool,
}

impl MockPwm {
    /// Create a channel at 0% duty
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel that rejects every write
    pub fn new_faulted() -> Self {
        Self {
            faulted: true,
            ..Self::default()
        }
    }
}

impl PwmInterface for MockPwm {
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        if self.faulted {
            return Err(PwmError::HardwareFault.into());
        }
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(PwmError::InvalidDutyCycle.into());
        }
        self.duty_cycle = duty_cycle;
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformError;

    #[test]
    fn test_mock_pwm_duty_cycle() {
        let mut pwm = MockPwm::new();
        assert_eq!(pwm.duty_cycle(), 0.0);

        pwm.set_duty_cycle(0.5).unwrap();
        assert_eq!(pwm.duty_cycle(), 0.5);

        assert!(pwm.set_duty_cycle(-0.1).is_err());
        assert!(pwm.set_duty_cycle(1.1).is_err());
        assert_eq!(pwm.duty_cycle(), 0.5);
    }

    #[test]
    fn test_faulted_pwm_rejects_writes() {
        let mut pwm = MockPwm::new_faulted();
        assert_eq!(
            pwm.set_duty_cycle(0.2),
            Err(PlatformError::Pwm(PwmError::HardwareFault))
        );
    }
}
