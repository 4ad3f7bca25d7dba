//! Sensor fault types

use core::fmt;

/// Faults reported by the line sensor array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault<E> {
    /// A channel's pin could not be driven or reconfigured
    Channel {
        /// Channel index (0 = leftest)
        index: usize,
        /// Underlying pin error
        error: E,
    },
    /// No channel discharged before the timeout, so the readings cannot be
    /// normalized
    AllChannelsTimedOut,
}

impl<E> SensorFault<E> {
    /// Replace the channel error type, keeping the fault kind
    pub fn map_channel<F>(self, f: impl FnOnce(E) -> F) -> SensorFault<F> {
        match self {
            SensorFault::Channel { index, error } => SensorFault::Channel {
                index,
                error: f(error),
            },
            SensorFault::AllChannelsTimedOut => SensorFault::AllChannelsTimedOut,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for SensorFault<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorFault::Channel { index, error } => {
                write!(f, "line sensor channel {} failed: {:?}", index, error)
            }
            SensorFault::AllChannelsTimedOut => {
                write!(f, "no line sensor channel discharged before timeout")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_channel_keeps_index() {
        let fault: SensorFault<u8> = SensorFault::Channel { index: 3, error: 7 };
        let mapped = fault.map_channel(u32::from);
        assert_eq!(mapped, SensorFault::Channel { index: 3, error: 7u32 });
    }

    #[test]
    fn test_map_channel_timeout_passthrough() {
        let fault: SensorFault<u8> = SensorFault::AllChannelsTimedOut;
        assert_eq!(
            fault.map_channel(u32::from),
            SensorFault::<u32>::AllChannelsTimedOut
        );
    }

    #[test]
    fn test_display() {
        extern crate std;
        use std::string::ToString;

        let fault: SensorFault<()> = SensorFault::AllChannelsTimedOut;
        assert_eq!(
            fault.to_string(),
            "no line sensor channel discharged before timeout"
        );
    }
}
