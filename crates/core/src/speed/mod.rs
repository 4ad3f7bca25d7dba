//! Wheel speed estimation and closed-loop cruise command
//!
//! Encoder counts are maintained outside the control core (interrupt
//! handlers). Each speed task run differences the counters against the last
//! snapshot, converts to counts per millisecond, low-pass filters the result
//! and feeds it to one speed controller per wheel. The controller outputs
//! form the default "go straight" command used by several navigation states.

use crate::motor::MotorCommand;

/// Encoder counter readings for both wheels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderSnapshot {
    /// Left wheel count
    pub left: i32,
    /// Right wheel count
    pub right: i32,
}

impl EncoderSnapshot {
    /// Create a snapshot from raw counts
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }
}

/// Externally maintained encoder counters (read-only)
pub trait EncoderCounters {
    /// Current counts of both wheels
    fn snapshot(&self) -> EncoderSnapshot;
}

/// Opaque per-wheel speed controller (PID law lives outside the core)
pub trait SpeedController {
    /// Compute the motor power needed to reach `demand` given `measured`
    fn update(&mut self, demand: f32, measured: f32) -> f32;

    /// Clear accumulated controller state
    fn reset(&mut self);
}

/// Filtered wheel speeds in counts per millisecond
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelSpeeds {
    /// Left wheel speed
    pub left: f32,
    /// Right wheel speed
    pub right: f32,
}

/// Speed estimation configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    /// Target wheel speed for the cruise command (counts/ms)
    pub demand: f32,
    /// Weight of the previous average in the low-pass filter (0.0-1.0)
    pub history_weight: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            demand: 0.3,
            history_weight: 0.7,
        }
    }
}

/// Exponential moving average of one wheel speed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedFilter {
    history_weight: f32,
    value: f32,
}

impl SpeedFilter {
    /// Create a filter starting at zero
    pub const fn new(history_weight: f32) -> Self {
        Self::with_value(history_weight, 0.0)
    }

    /// Create a filter starting at a known average
    pub const fn with_value(history_weight: f32, value: f32) -> Self {
        Self {
            history_weight,
            value,
        }
    }

    /// Blend a new instantaneous speed into the average
    pub fn apply(&mut self, instant: f32) -> f32 {
        self.value = self.history_weight * self.value + (1.0 - self.history_weight) * instant;
        self.value
    }

    /// Current average
    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Per-wheel speed estimator driving two speed controllers
pub struct SpeedEstimator<C: SpeedController> {
    left_pid: C,
    right_pid: C,
    left: SpeedFilter,
    right: SpeedFilter,
    last_counts: EncoderSnapshot,
    demand: f32,
    cruise: MotorCommand,
}

impl<C: SpeedController> SpeedEstimator<C> {
    /// Create an estimator
    ///
    /// `initial` is the encoder snapshot the first update differences against.
    pub fn new(left_pid: C, right_pid: C, initial: EncoderSnapshot, config: &SpeedConfig) -> Self {
        Self {
            left_pid,
            right_pid,
            left: SpeedFilter::new(config.history_weight),
            right: SpeedFilter::new(config.history_weight),
            last_counts: initial,
            demand: config.demand,
            cruise: MotorCommand::STOP,
        }
    }

    /// Update speeds from the current counters
    ///
    /// `elapsed_ms` is the time since the previous update. A zero interval
    /// leaves the estimate and the snapshot untouched.
    pub fn update(&mut self, counts: EncoderSnapshot, elapsed_ms: u64) -> WheelSpeeds {
        if elapsed_ms == 0 {
            return self.speeds();
        }

        let diff_left = counts.left.wrapping_sub(self.last_counts.left);
        let diff_right = counts.right.wrapping_sub(self.last_counts.right);
        self.last_counts = counts;

        let elapsed = elapsed_ms as f32;
        let left = self.left.apply(diff_left as f32 / elapsed);
        let right = self.right.apply(diff_right as f32 / elapsed);

        self.cruise = MotorCommand::new(
            self.left_pid.update(self.demand, left),
            self.right_pid.update(self.demand, right),
        );

        WheelSpeeds { left, right }
    }

    /// Latest filtered speeds
    pub fn speeds(&self) -> WheelSpeeds {
        WheelSpeeds {
            left: self.left.value(),
            right: self.right.value(),
        }
    }

    /// Latest controller output, the default straight-line command
    pub fn cruise_command(&self) -> MotorCommand {
        self.cruise
    }

    /// Target wheel speed (counts/ms)
    pub fn demand(&self) -> f32 {
        self.demand
    }

    /// Reset both wheel controllers
    pub fn reset_controllers(&mut self) {
        self.left_pid.reset();
        self.right_pid.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Proportional-only controller that records its inputs
    #[derive(Default)]
    struct RecordingController {
        last_demand: f32,
        last_measured: f32,
        resets: u32,
    }

    impl SpeedController for RecordingController {
        fn update(&mut self, demand: f32, measured: f32) -> f32 {
            self.last_demand = demand;
            self.last_measured = measured;
            (demand - measured) * 100.0
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn estimator(initial: EncoderSnapshot) -> SpeedEstimator<RecordingController> {
        SpeedEstimator::new(
            RecordingController::default(),
            RecordingController::default(),
            initial,
            &SpeedConfig::default(),
        )
    }

    #[test]
    fn test_filter_blends_history_and_sample() {
        // prior average 4.0, new sample 5.0 => 0.7 * 4.0 + 0.3 * 5.0
        let mut filter = SpeedFilter::with_value(0.7, 4.0);
        let avg = filter.apply(5.0);
        assert!((avg - 4.3).abs() < 1e-5);
    }

    #[test]
    fn test_update_uses_count_delta_over_elapsed() {
        let mut est = estimator(EncoderSnapshot::new(1000, 2000));
        est.left = SpeedFilter::with_value(0.7, 4.0);
        est.right = SpeedFilter::with_value(0.7, 4.0);

        // 100 counts in 20 ms => 5.0 counts/ms
        let speeds = est.update(EncoderSnapshot::new(1100, 2100), 20);
        assert!((speeds.left - 4.3).abs() < 1e-5);
        assert!((speeds.right - 4.3).abs() < 1e-5);
    }

    #[test]
    fn test_first_update_from_rest() {
        let mut est = estimator(EncoderSnapshot::default());
        let speeds = est.update(EncoderSnapshot::new(100, 50), 20);
        assert!((speeds.left - 1.5).abs() < 1e-5);
        assert!((speeds.right - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_snapshot_advances() {
        let mut est = estimator(EncoderSnapshot::default());
        est.update(EncoderSnapshot::new(100, 100), 20);
        // No motion since last update: instantaneous speed is zero
        let speeds = est.update(EncoderSnapshot::new(100, 100), 20);
        assert!((speeds.left - 1.05).abs() < 1e-5);
    }

    #[test]
    fn test_zero_elapsed_is_ignored() {
        let mut est = estimator(EncoderSnapshot::default());
        let speeds = est.update(EncoderSnapshot::new(500, 500), 0);
        assert_eq!(speeds, WheelSpeeds::default());

        // Snapshot was not consumed by the ignored update
        let speeds = est.update(EncoderSnapshot::new(500, 500), 20);
        assert!((speeds.left - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_controllers_receive_demand_and_average() {
        let mut est = estimator(EncoderSnapshot::default());
        est.update(EncoderSnapshot::new(20, 0), 20);

        assert!((est.left_pid.last_demand - 0.3).abs() < 1e-6);
        assert!((est.left_pid.last_measured - 0.3).abs() < 1e-6);
        assert!((est.right_pid.last_measured - 0.0).abs() < 1e-6);

        let cruise = est.cruise_command();
        assert!((cruise.left - 0.0).abs() < 1e-4);
        assert!((cruise.right - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset_controllers() {
        let mut est = estimator(EncoderSnapshot::default());
        est.reset_controllers();
        est.reset_controllers();
        assert_eq!(est.left_pid.resets, 2);
        assert_eq!(est.right_pid.resets, 2);
    }

    #[test]
    fn test_counter_wraparound() {
        let mut est = estimator(EncoderSnapshot::new(i32::MAX - 10, 0));
        let speeds = est.update(EncoderSnapshot::new(i32::MIN + 9, 0), 20);
        // 20 counts forward across the wrap
        assert!((speeds.left - 0.3).abs() < 1e-5);
    }
}
