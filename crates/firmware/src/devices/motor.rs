//! Differential drive on four PWM channels
//!
//! Each wheel has an H-bridge with a forward and a reverse input, each fed by
//! one PWM channel. [`pwm_drive`] assembles the core motor stack on top of
//! them: raw power is scaled to a duty cycle by [`ScaledDrive`] and split
//! across the bridge inputs by [`HBridgeMotor`].

use crate::core::motor::{HBridgeMotor, MotorError, PwmPin, ScaledDrive};
use crate::log_warn;
use crate::platform::PwmInterface;

/// Core PWM pin over a platform PWM channel
pub struct PwmOutput<P: PwmInterface> {
    channel: P,
}

impl<P: PwmInterface> PwmOutput<P> {
    /// Wrap a channel
    pub fn new(channel: P) -> Self {
        Self { channel }
    }

    /// Underlying channel
    pub fn channel(&self) -> &P {
        &self.channel
    }
}

impl<P: PwmInterface> PwmPin for PwmOutput<P> {
    fn set_duty(&mut self, duty: f32) -> Result<(), MotorError> {
        self.channel.set_duty_cycle(duty).map_err(|_e| {
            log_warn!("PWM duty write failed");
            MotorError::HardwareFault
        })
    }
}

/// One wheel's H-bridge
pub type PwmMotor<P> = HBridgeMotor<PwmOutput<P>, PwmOutput<P>>;

/// Both wheels behind the raw-power drive interface
pub type PwmDrive<P> = ScaledDrive<PwmMotor<P>, PwmMotor<P>>;

/// Build the drive from the four bridge inputs
pub fn pwm_drive<P: PwmInterface>(
    left_forward: P,
    left_reverse: P,
    right_forward: P,
    right_reverse: P,
) -> PwmDrive<P> {
    ScaledDrive::new(
        HBridgeMotor::new(PwmOutput::new(left_forward), PwmOutput::new(left_reverse)),
        HBridgeMotor::new(PwmOutput::new(right_forward), PwmOutput::new(right_reverse)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::motor::{DriveMotors, MotorCommand};
    use crate::platform::mock::MockPwm;

    fn drive() -> PwmDrive<MockPwm> {
        pwm_drive(MockPwm::new(), MockPwm::new(), MockPwm::new(), MockPwm::new())
    }

    fn duties(motor: &PwmMotor<MockPwm>) -> (f32, f32) {
        (
            motor.forward_pin().channel().duty_cycle(),
            motor.reverse_pin().channel().duty_cycle(),
        )
    }

    #[test]
    fn test_power_maps_to_bridge_duties() {
        let mut drive = drive();
        drive.apply(MotorCommand::new(-51.0, 127.5)).unwrap();

        let (forward, reverse) = duties(drive.left());
        assert_eq!(forward, 0.0);
        assert!((reverse - 0.2).abs() < 1e-6);

        let (forward, reverse) = duties(drive.right());
        assert!((forward - 0.5).abs() < 1e-6);
        assert_eq!(reverse, 0.0);
    }

    #[test]
    fn test_power_beyond_full_scale_saturates() {
        let mut drive = drive();
        drive.apply(MotorCommand::new(400.0, -400.0)).unwrap();
        assert_eq!(duties(drive.left()), (1.0, 0.0));
        assert_eq!(duties(drive.right()), (0.0, 1.0));

        drive.stop().unwrap();
        assert_eq!(duties(drive.left()), (0.0, 0.0));
        assert_eq!(duties(drive.right()), (0.0, 0.0));
    }

    #[test]
    fn test_channel_fault_becomes_motor_fault() {
        let mut drive = pwm_drive(
            MockPwm::new(),
            MockPwm::new(),
            MockPwm::new_faulted(),
            MockPwm::new(),
        );
        assert_eq!(
            drive.set_power(30.0, 30.0),
            Err(MotorError::HardwareFault)
        );
    }
}
