//! Device drivers built on the platform GPIO and PWM layers

pub mod indicators;
pub mod line_sensor;
pub mod motor;

pub use indicators::GpioIndicators;
pub use line_sensor::{GpioDischargeChannel, GpioEmitter};
pub use motor::{pwm_drive, PwmDrive, PwmMotor, PwmOutput};
