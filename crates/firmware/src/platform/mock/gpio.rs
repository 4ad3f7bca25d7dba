//! Mock GPIO implementation for testing

use crate::platform::{
    error::GpioError,
    traits::{GpioInterface, GpioMode},
    Result,
};

/// Mock GPIO pin
///
/// Tracks level, mode and the number of rising edges driven, so tests can
/// count buzzer pulses and check that sensing pins were charged.
#[derive(Debug)]
pub struct MockGpio {
    state: bool,
    mode: GpioMode,
    rising_edges: u32,
    /// Level reported once the pin is switched to input
    input_level: bool,
    /// Refuse every mode change
    stuck: bool,
}

impl MockGpio {
    /// Create a new mock GPIO in output mode
    pub fn new_output() -> Self {
        Self {
            state: false,
            mode: GpioMode::OutputPushPull,
            rising_edges: 0,
            input_level: false,
            stuck: false,
        }
    }

    /// Create a new mock GPIO in input mode
    pub fn new_input() -> Self {
        Self {
            mode: GpioMode::Input,
            ..Self::new_output()
        }
    }

    /// Create a pin whose mode cannot be changed
    pub fn new_stuck() -> Self {
        Self {
            stuck: true,
            ..Self::new_input()
        }
    }

    /// Set the level an input read returns
    pub fn set_input_state(&mut self, high: bool) {
        self.input_level = high;
        if !self.mode.is_output() {
            self.state = high;
        }
    }

    /// Number of low-to-high transitions driven so far
    pub fn rising_edges(&self) -> u32 {
        self.rising_edges
    }
}

impl GpioInterface for MockGpio {
    fn set_high(&mut self) -> Result<()> {
        if !self.mode.is_output() {
            return Err(GpioError::InvalidMode.into());
        }
        if !self.state {
            self.rising_edges = self.rising_edges.saturating_add(1);
        }
        self.state = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        if !self.mode.is_output() {
            return Err(GpioError::InvalidMode.into());
        }
        self.state = false;
        Ok(())
    }

    fn read(&self) -> bool {
        self.state
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        if self.stuck {
            return Err(GpioError::InvalidPin.into());
        }
        self.mode = mode;
        if !mode.is_output() {
            self.state = self.input_level;
        }
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
