//! Line sensor sample types and line error derivation

use super::error::SensorFault;

/// Number of reflectance channels in the array
pub const CHANNEL_COUNT: usize = 5;

/// Outermost left channel index
pub const LEFTEST: usize = 0;
/// Inner left channel index
pub const LEFT: usize = 1;
/// Center channel index
pub const CENTER: usize = 2;
/// Inner right channel index
pub const RIGHT: usize = 3;
/// Outermost right channel index
pub const RIGHTEST: usize = 4;

/// Configuration for the discharge measurement and the error derivation
#[derive(Clone, Debug, PartialEq)]
pub struct LineSensorConfig {
    /// Time the channels are driven high to charge the capacitor (µs)
    pub charge_us: u32,
    /// Polling is abandoned once this much time has passed (µs)
    pub timeout_us: u32,
    /// Center reading above which the centered override may apply (µs)
    pub override_center_min_us: u32,
    /// Both inner neighbours must read below this for the override (µs)
    pub override_neighbor_max_us: u32,
    /// Line error reported when the override applies
    pub override_error: f32,
}

impl Default for LineSensorConfig {
    fn default() -> Self {
        Self {
            charge_us: 10,
            timeout_us: 3000,
            override_center_min_us: 1500,
            override_neighbor_max_us: 1000,
            override_error: 0.09,
        }
    }
}

/// How a line error value was produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorSource {
    /// Normalized weighted difference of the outer channel pairs
    Weighted,
    /// Center channel dark with light neighbours: robot sits on the line
    CenteredOverride,
}

/// Line error derived from one sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineReading {
    /// Steering error, nominally in [-1, 1]; positive means the line is left
    pub e_line: f32,
    /// Which branch produced `e_line`
    pub source: ErrorSource,
}

/// Raw discharge durations of one measurement cycle
///
/// A duration of 0 means the channel did not discharge before the timeout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorSample {
    /// Discharge time per channel in microseconds, leftest first
    pub raw_us: [u32; CHANNEL_COUNT],
    /// Whether the channel was seen low before the timeout
    pub recorded: [bool; CHANNEL_COUNT],
}

impl SensorSample {
    /// Build a sample from raw durations, treating 0 as "not recorded"
    pub fn from_raw(raw_us: [u32; CHANNEL_COUNT]) -> Self {
        Self {
            raw_us,
            recorded: raw_us.map(|t| t > 0),
        }
    }

    /// Number of channels that discharged before the timeout
    pub fn recorded_count(&self) -> usize {
        self.recorded.iter().filter(|r| **r).count()
    }

    /// Sum of all raw durations (µs)
    pub fn sum_us(&self) -> u64 {
        self.raw_us.iter().map(|&t| u64::from(t)).sum()
    }

    /// Normalize each reading by the sum of all readings
    ///
    /// # Errors
    ///
    /// Returns `SensorFault::AllChannelsTimedOut` when the sum is zero.
    pub fn normalized<E>(&self) -> Result<[f32; CHANNEL_COUNT], SensorFault<E>> {
        let sum = self.sum_us();
        if sum == 0 {
            return Err(SensorFault::AllChannelsTimedOut);
        }
        let sum = sum as f32;
        Ok(self.raw_us.map(|t| t as f32 / sum))
    }

    /// True when the centered-on-line pattern is present
    pub fn is_centered(&self, config: &LineSensorConfig) -> bool {
        self.raw_us[CENTER] > config.override_center_min_us
            && self.raw_us[LEFT] < config.override_neighbor_max_us
            && self.raw_us[RIGHT] < config.override_neighbor_max_us
    }

    /// Derive the line error
    ///
    /// The center weight never enters the weighted difference, so a robot
    /// sitting squarely on the line would otherwise look identical to one
    /// that has lost it. The centered pattern is therefore checked first and
    /// reported as a fixed small error.
    ///
    /// # Errors
    ///
    /// Returns `SensorFault::AllChannelsTimedOut` when no channel recorded.
    pub fn line_error<E>(&self, config: &LineSensorConfig) -> Result<LineReading, SensorFault<E>> {
        if self.is_centered(config) {
            return Ok(LineReading {
                e_line: config.override_error,
                source: ErrorSource::CenteredOverride,
            });
        }

        let w = self.normalized()?;
        let e_line = (w[LEFTEST] + w[LEFT]) - (w[RIGHT] + w[RIGHTEST]);
        Ok(LineReading {
            e_line,
            source: ErrorSource::Weighted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_of(raw: [u32; CHANNEL_COUNT]) -> Result<LineReading, SensorFault<()>> {
        SensorSample::from_raw(raw).line_error(&LineSensorConfig::default())
    }

    #[test]
    fn test_equal_readings_give_zero_error() {
        let sample = SensorSample::from_raw([500; CHANNEL_COUNT]);
        let weights = sample.normalized::<()>().unwrap();
        for w in weights {
            assert_eq!(w, 0.2);
        }

        let reading = error_of([500; CHANNEL_COUNT]).unwrap();
        assert_eq!(reading.e_line, 0.0);
        assert_eq!(reading.source, ErrorSource::Weighted);
    }

    #[test]
    fn test_line_left_is_positive() {
        let reading = error_of([2800, 2400, 900, 500, 450]).unwrap();
        assert!(reading.e_line > 0.0);
    }

    #[test]
    fn test_line_right_is_negative() {
        let reading = error_of([450, 500, 900, 2400, 2800]).unwrap();
        assert!(reading.e_line < 0.0);
    }

    #[test]
    fn test_weighted_error_value() {
        // sum = 5000; (1000 + 2000 - 500 - 500) / 5000 = 0.4
        let reading = error_of([1000, 2000, 1000, 500, 500]).unwrap();
        assert!((reading.e_line - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_centered_override() {
        let reading = error_of([400, 500, 1800, 550, 420]).unwrap();
        assert_eq!(reading.e_line, 0.09);
        assert_eq!(reading.source, ErrorSource::CenteredOverride);
    }

    #[test]
    fn test_override_ignores_outer_channels() {
        let a = error_of([2900, 500, 1800, 550, 0]).unwrap();
        let b = error_of([0, 500, 1800, 550, 2900]).unwrap();
        assert_eq!(a.e_line, 0.09);
        assert_eq!(b.e_line, 0.09);
    }

    #[test]
    fn test_override_boundaries_are_strict() {
        // center exactly at threshold: weighted path
        let reading = error_of([400, 500, 1500, 550, 420]).unwrap();
        assert_eq!(reading.source, ErrorSource::Weighted);

        // neighbour exactly at threshold: weighted path
        let reading = error_of([400, 1000, 1800, 550, 420]).unwrap();
        assert_eq!(reading.source, ErrorSource::Weighted);
    }

    #[test]
    fn test_all_timed_out_is_fault() {
        let result = error_of([0; CHANNEL_COUNT]);
        assert_eq!(result, Err(SensorFault::AllChannelsTimedOut));
    }

    #[test]
    fn test_partial_timeout_is_degraded_reading() {
        // Right side never discharged; reads as light surface on the right
        let sample = SensorSample::from_raw([1200, 900, 700, 0, 0]);
        assert_eq!(sample.recorded_count(), 3);

        let reading = sample.line_error::<()>(&LineSensorConfig::default()).unwrap();
        assert!(reading.e_line > 0.0);
    }

    #[test]
    fn test_default_config() {
        let config = LineSensorConfig::default();
        assert_eq!(config.charge_us, 10);
        assert_eq!(config.timeout_us, 3000);
        assert_eq!(config.override_center_min_us, 1500);
        assert_eq!(config.override_neighbor_max_us, 1000);
        assert!((config.override_error - 0.09).abs() < 1e-6);
    }
}
