//! Control loop telemetry
//!
//! A snapshot of what the control loop last observed and did, plus fault
//! counters and a short history of navigation transitions for diagnostics.

use heapless::Deque;

use crate::core::motor::MotorCommand;
use crate::core::navigation::{Maneuver, NavigationState, Transition};
use crate::core::sensor::ErrorSource;
use crate::core::speed::WheelSpeeds;

/// Number of navigation transitions kept
pub const TRANSITION_HISTORY: usize = 16;

/// Navigation transition with the time it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedTransition {
    /// Navigation tick time (ms)
    pub at_ms: u64,
    /// State change
    pub transition: Transition,
}

/// Control loop telemetry
#[derive(Debug, Clone)]
pub struct Telemetry {
    /// Line error used by the last navigation tick
    pub e_line: f32,
    /// How the last successful sample produced `e_line`
    pub line_source: Option<ErrorSource>,
    /// Sensor samples that failed (timeouts included)
    pub sensor_faults: u32,
    /// Motor commands the drive rejected
    pub motor_faults: u32,
    /// Last command handed to the motors
    pub last_command: MotorCommand,
    /// Navigation state after the last tick
    pub state: NavigationState,
    /// Consecutive lost ticks after the last tick
    pub lost_line_count: u32,
    /// Maneuver in progress
    pub maneuver: Option<Maneuver>,
    /// When the maneuver in progress started (ms)
    pub maneuver_started_ms: Option<u64>,
    /// Longest completed maneuver (ms)
    pub longest_maneuver_ms: u64,
    /// Home heading once computed (radians)
    pub home_heading: Option<f32>,
    /// Latest filtered wheel speeds
    pub speeds: WheelSpeeds,
    /// Buzzer pulses requested
    pub buzzer_pulses: u32,
    /// Speed controller resets requested
    pub controller_resets: u32,
    /// Control loop passes
    pub passes: u64,
    /// IR emitter lit
    pub emitter_on: bool,
    transitions: Deque<TimedTransition, TRANSITION_HISTORY>,
}

impl Telemetry {
    /// Create empty telemetry
    pub fn new() -> Self {
        Self {
            e_line: 0.0,
            line_source: None,
            sensor_faults: 0,
            motor_faults: 0,
            last_command: MotorCommand::STOP,
            state: NavigationState::Search,
            lost_line_count: 0,
            maneuver: None,
            maneuver_started_ms: None,
            longest_maneuver_ms: 0,
            home_heading: None,
            speeds: WheelSpeeds::default(),
            buzzer_pulses: 0,
            controller_resets: 0,
            passes: 0,
            emitter_on: false,
            transitions: Deque::new(),
        }
    }

    /// Count a control loop pass
    pub fn note_pass(&mut self) {
        self.passes = self.passes.saturating_add(1);
    }

    /// Count a failed sensor sample
    pub fn note_sensor_fault(&mut self) {
        self.sensor_faults = self.sensor_faults.saturating_add(1);
    }

    /// Count a rejected motor command
    pub fn note_motor_fault(&mut self) {
        self.motor_faults = self.motor_faults.saturating_add(1);
    }

    /// Count a speed controller reset
    pub fn note_controller_reset(&mut self) {
        self.controller_resets = self.controller_resets.saturating_add(1);
    }

    /// Count a buzzer pulse
    pub fn note_buzzer_pulse(&mut self) {
        self.buzzer_pulses = self.buzzer_pulses.saturating_add(1);
    }

    /// Record a transition, dropping the oldest when the history is full
    pub fn record_transition(&mut self, transition: Transition, at_ms: u64) {
        if self.transitions.is_full() {
            self.transitions.pop_front();
        }
        // Cannot fail after the pop above
        let _ = self
            .transitions
            .push_back(TimedTransition { at_ms, transition });
    }

    /// Recorded transitions, oldest first
    pub fn transitions(&self) -> impl Iterator<Item = &TimedTransition> {
        self.transitions.iter()
    }

    /// Most recent transition
    pub fn last_transition(&self) -> Option<&TimedTransition> {
        self.transitions.back()
    }

    /// Note the start of a maneuver
    pub fn maneuver_started(&mut self, now_ms: u64) {
        self.maneuver_started_ms = Some(now_ms);
    }

    /// Note the end of the maneuver in progress and return its duration
    pub fn maneuver_finished(&mut self, now_ms: u64) -> u64 {
        let duration_ms = self
            .maneuver_started_ms
            .take()
            .map_or(0, |start| now_ms.saturating_sub(start));
        self.longest_maneuver_ms = self.longest_maneuver_ms.max(duration_ms);
        duration_ms
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
