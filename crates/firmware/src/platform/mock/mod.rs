//! Mock platform implementations for host testing

pub mod gpio;
pub mod pwm;

pub use gpio::MockGpio;
pub use pwm::MockPwm;
