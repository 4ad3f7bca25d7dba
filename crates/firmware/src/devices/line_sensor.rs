//! Reflectance channel and IR emitter drivers
//!
//! Adapts a bidirectional GPIO pin to the core sensor array's
//! [`DischargeChannel`] contract. Charging drives the pin high as a push-pull
//! output; releasing turns it into a high-impedance input so the capacitor
//! discharges through the phototransistor.
//!
//! The array only measures reflectance while the emitter pin is held high.

use crate::core::sensor::{DischargeChannel, IrEmitter};
use crate::platform::{GpioInterface, GpioMode, PlatformError};

/// One reflectance channel on a GPIO pin
pub struct GpioDischargeChannel<G: GpioInterface> {
    pin: G,
}

impl<G: GpioInterface> GpioDischargeChannel<G> {
    /// Wrap a pin
    pub fn new(pin: G) -> Self {
        Self { pin }
    }

    /// Underlying pin
    pub fn pin(&self) -> &G {
        &self.pin
    }

    /// Mutable access to the underlying pin
    pub fn pin_mut(&mut self) -> &mut G {
        &mut self.pin
    }
}

impl<G: GpioInterface> DischargeChannel for GpioDischargeChannel<G> {
    type Error = PlatformError;

    fn charge(&mut self) -> Result<(), Self::Error> {
        self.pin.set_mode(GpioMode::OutputPushPull)?;
        self.pin.set_high()
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.pin.set_mode(GpioMode::Input)
    }

    fn is_discharged(&mut self) -> bool {
        !self.pin.read()
    }
}

/// IR emitter on a GPIO pin
///
/// Lit while the pin is a push-pull output driven high; released to a
/// high-impedance input when off.
pub struct GpioEmitter<G: GpioInterface> {
    pin: G,
    enabled: bool,
}

impl<G: GpioInterface> GpioEmitter<G> {
    /// Wrap a pin; the emitter stays off until [`enable`](IrEmitter::enable)
    pub fn new(pin: G) -> Self {
        Self {
            pin,
            enabled: false,
        }
    }

    /// True after a successful `enable`
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Underlying pin
    pub fn pin(&self) -> &G {
        &self.pin
    }
}

impl<G: GpioInterface> IrEmitter for GpioEmitter<G> {
    type Error = PlatformError;

    fn enable(&mut self) -> Result<(), Self::Error> {
        if !self.pin.mode().is_output() {
            self.pin.set_mode(GpioMode::OutputPushPull)?;
        }
        self.pin.set_high()?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.pin.set_mode(GpioMode::Input)?;
        self.enabled = false;
        Ok(())
    }
}
