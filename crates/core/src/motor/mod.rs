//! Motor actuation abstraction
//!
//! The navigation core speaks in raw differential power pairs
//! ([`MotorCommand`]) on the same scale as the 8-bit PWM the robot was tuned
//! with, and hands them to a [`DriveMotors`] implementation. No range is
//! enforced by the core; the formulas that produce commands keep them in a
//! sane range empirically.
//!
//! # Features
//!
//! - `DriveMotors` trait: the `set_power(left, right)` actuation interface
//! - `Motor` trait for a single normalized DC motor
//! - H-bridge motor driver implementation (DRV8837 2-pin PWM control)
//! - `ScaledDrive`: maps raw power onto two normalized motors, clamping at the
//!   actuator boundary

/// Motor control error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    /// Speed value outside [-1.0, +1.0] range
    InvalidSpeed,
    /// Hardware PWM channel unavailable or initialization failed
    HardwareFault,
}

impl core::fmt::Display for MotorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotorError::InvalidSpeed => write!(f, "motor speed out of range"),
            MotorError::HardwareFault => write!(f, "motor hardware fault"),
        }
    }
}

/// Differential power command (left, right)
///
/// Positive values drive the wheel forward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorCommand {
    /// Left wheel power
    pub left: f32,
    /// Right wheel power
    pub right: f32,
}

impl MotorCommand {
    /// Both wheels stopped
    pub const STOP: Self = Self::new(0.0, 0.0);

    /// Create a new command
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Same power on both wheels
    pub const fn straight(power: f32) -> Self {
        Self::new(power, power)
    }

    /// True if both wheels are commanded to zero
    pub fn is_stop(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// Two-wheel actuation interface consumed by the control loop
pub trait DriveMotors {
    /// Apply raw differential power
    ///
    /// # Errors
    ///
    /// Returns `MotorError::HardwareFault` if the actuator fails.
    fn set_power(&mut self, left: f32, right: f32) -> Result<(), MotorError>;

    /// Apply a [`MotorCommand`]
    ///
    /// # Errors
    ///
    /// Returns `MotorError::HardwareFault` if the actuator fails.
    fn apply(&mut self, command: MotorCommand) -> Result<(), MotorError> {
        self.set_power(command.left, command.right)
    }

    /// Stop both wheels
    ///
    /// # Errors
    ///
    /// Returns `MotorError::HardwareFault` if the actuator fails.
    fn stop(&mut self) -> Result<(), MotorError> {
        self.set_power(0.0, 0.0)
    }
}

/// One PWM output feeding a bridge input
pub trait PwmPin {
    /// Set the duty cycle, 0.0 (off) to 1.0 (always on)
    ///
    /// # Errors
    ///
    /// Returns `MotorError::HardwareFault` if the PWM slice rejects the value.
    fn set_duty(&mut self, duty: f32) -> Result<(), MotorError>;
}

/// A single wheel motor driven at a normalized speed
///
/// `1.0` is full forward, `-1.0` full reverse and `0.0` stopped.
pub trait Motor {
    /// Drive at `speed`
    ///
    /// # Errors
    ///
    /// - `MotorError::InvalidSpeed` if `speed` is outside [-1.0, 1.0]
    /// - `MotorError::HardwareFault` if an output fails
    fn set_speed(&mut self, speed: f32) -> Result<(), MotorError>;

    /// Let the wheel coast
    ///
    /// # Errors
    ///
    /// Returns `MotorError::HardwareFault` if an output fails.
    fn stop(&mut self) -> Result<(), MotorError>;
}

/// Two-input H-bridge such as the DRV8837
///
/// The forward input carries the PWM when driving forward, the reverse
/// input when driving backward. Both inputs low lets the wheel coast.
pub struct HBridgeMotor<F: PwmPin, B: PwmPin> {
    forward: F,
    reverse: B,
}

impl<F: PwmPin, B: PwmPin> HBridgeMotor<F, B> {
    /// Create a motor from its forward and reverse inputs
    pub fn new(forward: F, reverse: B) -> Self {
        Self { forward, reverse }
    }

    /// Forward input
    pub fn forward_pin(&self) -> &F {
        &self.forward
    }

    /// Reverse input
    pub fn reverse_pin(&self) -> &B {
        &self.reverse
    }
}

/// Split a signed speed into (forward, reverse) duties
fn bridge_duties(speed: f32) -> (f32, f32) {
    if speed >= 0.0 {
        (speed, 0.0)
    } else {
        (0.0, -speed)
    }
}

impl<F: PwmPin, B: PwmPin> Motor for HBridgeMotor<F, B> {
    fn set_speed(&mut self, speed: f32) -> Result<(), MotorError> {
        if !(-1.0..=1.0).contains(&speed) {
            return Err(MotorError::InvalidSpeed);
        }

        let (forward, reverse) = bridge_duties(speed);
        // Release the idle input first so both are never driven together
        if forward > 0.0 {
            self.reverse.set_duty(0.0)?;
            self.forward.set_duty(forward)
        } else {
            self.forward.set_duty(0.0)?;
            self.reverse.set_duty(reverse)
        }
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        self.forward.set_duty(0.0)?;
        self.reverse.set_duty(0.0)
    }
}

/// Default full-scale raw power (8-bit PWM)
pub const DEFAULT_FULL_SCALE_POWER: f32 = 255.0;

/// Differential drive over two normalized motors
///
/// Raw power is divided by `full_scale` and clamped to [-1.0, +1.0] before
/// reaching the motors, so the unclamped commands of the navigation core
/// can never trip `MotorError::InvalidSpeed`.
pub struct ScaledDrive<L: Motor, R: Motor> {
    left: L,
    right: R,
    full_scale: f32,
}

impl<L: Motor, R: Motor> ScaledDrive<L, R> {
    /// Create a drive with the default 8-bit full scale
    pub fn new(left: L, right: R) -> Self {
        Self::with_full_scale(left, right, DEFAULT_FULL_SCALE_POWER)
    }

    /// Create a drive with a custom full-scale raw power
    pub fn with_full_scale(left: L, right: R, full_scale: f32) -> Self {
        Self {
            left,
            right,
            full_scale,
        }
    }

    /// Left motor
    pub fn left(&self) -> &L {
        &self.left
    }

    /// Right motor
    pub fn right(&self) -> &R {
        &self.right
    }

    fn normalize(&self, power: f32) -> f32 {
        if power.is_nan() || self.full_scale <= 0.0 {
            return 0.0;
        }
        (power / self.full_scale).clamp(-1.0, 1.0)
    }
}

impl<L: Motor, R: Motor> DriveMotors for ScaledDrive<L, R> {
    fn set_power(&mut self, left: f32, right: f32) -> Result<(), MotorError> {
        let left = self.normalize(left);
        let right = self.normalize(right);
        self.left.set_speed(left)?;
        self.right.set_speed(right)
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        self.left.stop()?;
        self.right.stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingPin {
        duty: f32,
        writes: u32,
    }

    impl PwmPin for RecordingPin {
        fn set_duty(&mut self, duty: f32) -> Result<(), MotorError> {
            self.duty = duty;
            self.writes += 1;
            Ok(())
        }
    }

    struct BrokenPin;

    impl PwmPin for BrokenPin {
        fn set_duty(&mut self, _duty: f32) -> Result<(), MotorError> {
            Err(MotorError::HardwareFault)
        }
    }

    type TestMotor = HBridgeMotor<RecordingPin, RecordingPin>;

    fn motor() -> TestMotor {
        HBridgeMotor::new(RecordingPin::default(), RecordingPin::default())
    }

    fn duties(motor: &TestMotor) -> (f32, f32) {
        (motor.forward_pin().duty, motor.reverse_pin().duty)
    }

    #[test]
    fn test_bridge_duties_by_direction() {
        let mut m = motor();
        m.set_speed(0.6).unwrap();
        assert_eq!(duties(&m), (0.6, 0.0));

        m.set_speed(-0.25).unwrap();
        assert_eq!(duties(&m), (0.0, 0.25));

        m.set_speed(0.0).unwrap();
        assert_eq!(duties(&m), (0.0, 0.0));
    }

    #[test]
    fn test_stop_coasts() {
        let mut m = motor();
        m.set_speed(-1.0).unwrap();
        Motor::stop(&mut m).unwrap();
        assert_eq!(duties(&m), (0.0, 0.0));
    }

    #[test]
    fn test_out_of_range_speed_rejected() {
        let mut m = motor();
        assert_eq!(m.set_speed(1.01), Err(MotorError::InvalidSpeed));
        assert_eq!(m.set_speed(-2.0), Err(MotorError::InvalidSpeed));
        assert_eq!(m.forward_pin().writes, 0);
    }

    #[test]
    fn test_pwm_failure_propagates() {
        let mut m = HBridgeMotor::new(BrokenPin, BrokenPin);
        assert_eq!(m.set_speed(0.5), Err(MotorError::HardwareFault));
    }

    #[test]
    fn test_motor_command_helpers() {
        assert!(MotorCommand::STOP.is_stop());
        assert_eq!(MotorCommand::straight(22.0), MotorCommand::new(22.0, 22.0));
        assert!(!MotorCommand::new(0.0, 52.5).is_stop());
    }

    #[test]
    fn test_scaled_drive_maps_raw_power() {
        let mut drive = ScaledDrive::new(motor(), motor());
        drive.set_power(51.0, -127.5).unwrap();

        assert!((drive.left().forward_pin().duty - 0.2).abs() < 1e-6);
        assert!((drive.right().reverse_pin().duty - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_scaled_drive_clamps_at_actuator() {
        let mut drive = ScaledDrive::with_full_scale(motor(), motor(), 100.0);
        drive.apply(MotorCommand::new(250.0, -400.0)).unwrap();

        assert_eq!(duties(drive.left()), (1.0, 0.0));
        assert_eq!(duties(drive.right()), (0.0, 1.0));
    }

    #[test]
    fn test_scaled_drive_nan_is_coast() {
        let mut drive = ScaledDrive::new(motor(), motor());
        drive.set_power(f32::NAN, 0.0).unwrap();
        assert_eq!(duties(drive.left()), (0.0, 0.0));
    }

    #[test]
    fn test_scaled_drive_stop() {
        let mut drive = ScaledDrive::new(motor(), motor());
        drive.set_power(100.0, 100.0).unwrap();
        DriveMotors::stop(&mut drive).unwrap();
        assert_eq!(duties(drive.left()), (0.0, 0.0));
        assert_eq!(duties(drive.right()), (0.0, 0.0));
    }
}
