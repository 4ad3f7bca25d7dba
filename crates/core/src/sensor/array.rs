//! Simultaneous discharge-time measurement across all channels

use embedded_hal::delay::DelayNs;

use super::error::SensorFault;
use super::types::{LineReading, LineSensorConfig, SensorSample, CHANNEL_COUNT};
use crate::traits::TimeSource;

/// One reflectance channel wired to a bidirectional pin
///
/// Platform implementations switch the pin between a push-pull output and a
/// high-impedance input.
pub trait DischargeChannel {
    /// Pin error type
    type Error;

    /// Drive the pin high as an output to charge the capacitor
    fn charge(&mut self) -> Result<(), Self::Error>;

    /// Switch the pin to a high-impedance input so the capacitor discharges
    fn release(&mut self) -> Result<(), Self::Error>;

    /// True once the pin reads low
    fn is_discharged(&mut self) -> bool;
}

/// Infrared emitter lighting the surface under the channels
///
/// The channels read an unlit surface while the emitter is off.
pub trait IrEmitter {
    /// Pin error type
    type Error;

    /// Switch the emitter on
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Switch the emitter off
    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// Five-channel line sensor array
///
/// Sampling blocks for at most `charge_us * 5 + timeout_us`, which is why the
/// sensor task must not be scheduled more often than roughly every 8 ms.
pub struct LineSensorArray<C, T, D>
where
    C: DischargeChannel,
    T: TimeSource,
    D: DelayNs,
{
    channels: [C; CHANNEL_COUNT],
    time: T,
    delay: D,
    config: LineSensorConfig,
    last_sample: SensorSample,
}

impl<C, T, D> LineSensorArray<C, T, D>
where
    C: DischargeChannel,
    T: TimeSource,
    D: DelayNs,
{
    /// Create a new array from channels ordered leftest to rightest
    pub fn new(channels: [C; CHANNEL_COUNT], time: T, delay: D, config: LineSensorConfig) -> Self {
        Self {
            channels,
            time,
            delay,
            config,
            last_sample: SensorSample::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &LineSensorConfig {
        &self.config
    }

    /// Raw durations from the most recent measurement
    pub fn last_sample(&self) -> &SensorSample {
        &self.last_sample
    }

    /// Mutable access to a channel (for diagnostics and tests)
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut C> {
        self.channels.get_mut(index)
    }

    /// Measure all channels and derive the line error
    ///
    /// # Errors
    ///
    /// - `SensorFault::Channel` if a pin cannot be charged or released
    /// - `SensorFault::AllChannelsTimedOut` if nothing discharged in time
    pub fn sample(&mut self) -> Result<LineReading, SensorFault<C::Error>> {
        let sample = self.measure()?;
        sample.line_error(&self.config)
    }

    /// Run one charge/discharge cycle and return the raw durations
    ///
    /// # Errors
    ///
    /// Returns `SensorFault::Channel` if a pin cannot be charged or released.
    pub fn measure(&mut self) -> Result<SensorSample, SensorFault<C::Error>> {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel
                .charge()
                .map_err(|error| SensorFault::Channel { index, error })?;
            self.delay.delay_us(self.config.charge_us);
            channel
                .release()
                .map_err(|error| SensorFault::Channel { index, error })?;
        }

        let timeout_us = u64::from(self.config.timeout_us);
        let mut sample = SensorSample::default();
        let mut remaining = CHANNEL_COUNT;

        // One start time shared by every channel
        let start_us = self.time.now_us();

        while remaining > 0 {
            let elapsed_us = self.time.elapsed_since(start_us);

            for (index, channel) in self.channels.iter_mut().enumerate() {
                if !sample.recorded[index] && channel.is_discharged() {
                    sample.raw_us[index] = elapsed_us.min(u64::from(u32::MAX)) as u32;
                    sample.recorded[index] = true;
                    remaining -= 1;
                }
            }

            if elapsed_us >= timeout_us {
                break;
            }
        }

        self.last_sample = sample;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::ErrorSource;
    use crate::traits::MockTime;

    /// Channel that discharges at a fixed time after release
    ///
    /// Every read costs one microsecond of simulated polling time.
    struct SimChannel<'a> {
        time: &'a MockTime,
        discharge_after_us: Option<u64>,
        released_at_us: Option<u64>,
        fail_charge: bool,
    }

    impl<'a> SimChannel<'a> {
        fn new(time: &'a MockTime, discharge_after_us: Option<u64>) -> Self {
            Self {
                time,
                discharge_after_us,
                released_at_us: None,
                fail_charge: false,
            }
        }
    }

    impl DischargeChannel for SimChannel<'_> {
        type Error = &'static str;

        fn charge(&mut self) -> Result<(), Self::Error> {
            if self.fail_charge {
                return Err("pin stuck");
            }
            self.released_at_us = None;
            Ok(())
        }

        fn release(&mut self) -> Result<(), Self::Error> {
            self.released_at_us = Some(self.time.now_us());
            Ok(())
        }

        fn is_discharged(&mut self) -> bool {
            let now = self.time.now_us();
            self.time.advance(1);
            match (self.released_at_us, self.discharge_after_us) {
                (Some(released), Some(after)) => now >= released + after,
                _ => false,
            }
        }
    }

    fn array<'a>(
        time: &'a MockTime,
        discharge: [Option<u64>; CHANNEL_COUNT],
    ) -> LineSensorArray<SimChannel<'a>, &'a MockTime, &'a MockTime> {
        let channels = discharge.map(|d| SimChannel::new(time, d));
        LineSensorArray::new(channels, time, time, LineSensorConfig::default())
    }

    #[test]
    fn test_measure_records_each_channel_once() {
        let time = MockTime::new();
        let mut sensors = array(
            &time,
            [Some(400), Some(500), Some(1800), Some(550), Some(420)],
        );

        let sample = sensors.measure().unwrap();
        assert_eq!(sample.recorded_count(), CHANNEL_COUNT);

        // Channels charged first start discharging first, so they read up to
        // 40 µs short of their nominal value, plus a few µs of polling slack.
        let nominal = [400u32, 500, 1800, 550, 420];
        for (raw, expected) in sample.raw_us.iter().zip(nominal) {
            assert!(*raw <= expected, "{} > {}", raw, expected);
            assert!(*raw + 50 >= expected, "{} too far from {}", raw, expected);
        }
    }

    #[test]
    fn test_sample_uses_center_override() {
        let time = MockTime::new();
        let mut sensors = array(
            &time,
            [Some(400), Some(500), Some(1800), Some(550), Some(420)],
        );

        let reading = sensors.sample().unwrap();
        assert_eq!(reading.source, ErrorSource::CenteredOverride);
        assert_eq!(reading.e_line, 0.09);
    }

    #[test]
    fn test_timeout_bounds_polling() {
        let time = MockTime::new();
        let mut sensors = array(&time, [None, Some(600), Some(700), None, None]);

        let start = time.now_us();
        let sample = sensors.measure().unwrap();
        let spent = time.now_us() - start;

        assert_eq!(sample.raw_us[0], 0);
        assert_eq!(sample.raw_us[3], 0);
        assert_eq!(sample.raw_us[4], 0);
        assert!(!sample.recorded[0]);
        assert!(sample.recorded[1]);
        // 5 x 10 µs charge + 3000 µs timeout + one final poll
        assert!(spent <= 50 + 3000 + 10);
    }

    #[test]
    fn test_all_timed_out_reports_fault() {
        let time = MockTime::new();
        let mut sensors = array(&time, [None; CHANNEL_COUNT]);

        assert_eq!(sensors.sample(), Err(SensorFault::AllChannelsTimedOut));
        assert_eq!(sensors.last_sample().recorded_count(), 0);
    }

    #[test]
    fn test_charge_failure_reports_channel() {
        let time = MockTime::new();
        let mut sensors = array(&time, [Some(500); CHANNEL_COUNT]);
        sensors.channel_mut(2).unwrap().fail_charge = true;

        assert_eq!(
            sensors.sample(),
            Err(SensorFault::Channel {
                index: 2,
                error: "pin stuck"
            })
        );
    }
}
