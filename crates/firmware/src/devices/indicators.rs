//! LED and buzzer outputs

use crate::core::traits::Indicators;
use crate::log_warn;
use crate::platform::GpioInterface;

/// Line indicator LED and buzzer on two output pins
///
/// Output failures are logged and otherwise ignored; the indicators never
/// stop the control loop.
pub struct GpioIndicators<L: GpioInterface, B: GpioInterface> {
    led: L,
    buzzer: B,
    led_on: bool,
    pulses: u32,
}

impl<L: GpioInterface, B: GpioInterface> GpioIndicators<L, B> {
    /// Create indicators from two output pins
    pub fn new(led: L, buzzer: B) -> Self {
        Self {
            led,
            buzzer,
            led_on: false,
            pulses: 0,
        }
    }

    /// Last requested LED state
    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// Buzzer pulses emitted since start
    pub fn pulse_count(&self) -> u32 {
        self.pulses
    }

    /// LED pin
    pub fn led(&self) -> &L {
        &self.led
    }

    /// Buzzer pin
    pub fn buzzer(&self) -> &B {
        &self.buzzer
    }
}

impl<L: GpioInterface, B: GpioInterface> Indicators for GpioIndicators<L, B> {
    fn set_line_indicator(&mut self, on: bool) {
        if on == self.led_on {
            return;
        }
        let result = if on {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        match result {
            Ok(()) => self.led_on = on,
            Err(_) => log_warn!("line indicator write failed"),
        }
    }

    fn pulse_buzzer(&mut self) {
        let result = self.buzzer.set_high().and_then(|()| self.buzzer.set_low());
        match result {
            Ok(()) => self.pulses = self.pulses.saturating_add(1),
            Err(_) => log_warn!("buzzer pulse failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockGpio;

    fn indicators() -> GpioIndicators<MockGpio, MockGpio> {
        GpioIndicators::new(MockGpio::new_output(), MockGpio::new_output())
    }

    #[test]
    fn test_led_follows_requests() {
        let mut ind = indicators();
        ind.set_line_indicator(true);
        assert!(ind.led_on());
        assert!(ind.led().read());

        ind.set_line_indicator(false);
        assert!(!ind.led_on());
        assert!(!ind.led().read());
    }

    #[test]
    fn test_buzzer_pulse_returns_low() {
        let mut ind = indicators();
        ind.pulse_buzzer();
        ind.pulse_buzzer();

        assert_eq!(ind.pulse_count(), 2);
        assert_eq!(ind.buzzer().rising_edges(), 2);
        assert!(!ind.buzzer().read());
    }

    #[test]
    fn test_output_failure_is_swallowed() {
        let mut ind = GpioIndicators::new(MockGpio::new_input(), MockGpio::new_input());
        ind.set_line_indicator(true);
        ind.pulse_buzzer();

        assert!(!ind.led_on());
        assert_eq!(ind.pulse_count(), 0);
    }
}
