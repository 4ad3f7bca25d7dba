//! Indicator I/O interface
//!
//! Write-only outputs driven purely as a function of navigation state.

/// Line indicator light and audible buzzer
pub trait Indicators {
    /// Drive the "on line" light
    fn set_line_indicator(&mut self, on: bool);

    /// Emit a single buzzer pulse
    ///
    /// The pulse shape is owned by the implementation; the navigator requests
    /// at most one pulse per navigation tick.
    fn pulse_buzzer(&mut self);
}
