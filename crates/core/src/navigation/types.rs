//! Navigation type definitions
//!
//! This module contains core types used by the navigation state machine:
//! - `NavigationConfig`: Thresholds, durations and fixed powers
//! - `SteeringConfig`: Proportional line-following law for the on-line state
//! - `NavInputs`: Per-tick snapshot consumed by the state machine
//! - `NavOutput`: Per-tick decision produced by the state machine

use super::state::{Maneuver, NavigationState, Transition};
use crate::motor::MotorCommand;
use crate::traits::Pose;

/// Three-tier steering law used while on the line
#[derive(Clone, Debug, PartialEq)]
pub struct SteeringConfig {
    /// |e_line| above which one wheel stops and the other pivots
    pub sharp_threshold: f32,
    /// Pivot wheel power per unit of error
    pub sharp_gain: f32,
    /// |e_line| above which the robot arcs toward the line
    pub arc_threshold: f32,
    /// Arc outer wheel power per unit of error
    pub arc_gain: f32,
    /// Fixed left wheel power while arcing left
    pub arc_base_left: f32,
    /// Fixed right wheel power while arcing right
    pub arc_base_right: f32,
    /// Fixed power on both wheels when lined up
    pub straight_power: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            sharp_threshold: 0.20,
            sharp_gain: 105.0,
            arc_threshold: 0.10,
            arc_gain: 250.0,
            // Weaker right motor
            arc_base_left: 22.0,
            arc_base_right: 23.0,
            straight_power: 22.0,
        }
    }
}

/// Configuration for the navigation state machine
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationConfig {
    /// Navigation task period in milliseconds
    pub period_ms: u32,
    /// Consecutive lost time after which the robot decides between a
    /// recovery turn and end of track (ms)
    pub lost_timeout_ms: u32,
    /// |e_line| below which the robot keeps searching
    pub search_threshold: f32,
    /// |e_line| below which the line counts as lost
    pub lost_threshold: f32,
    /// Heading magnitude that ends the join turn (radians)
    pub join_heading_rad: f32,
    /// Longitudinal distance separating "overshot a curve" from "end of
    /// track" (mm)
    pub end_of_track_x_mm: f32,
    /// Subtracted from the half-turn target of the recovery turn (radians)
    pub recovery_overshoot_rad: f32,
    /// Heading tolerance when aligning with home (radians)
    pub return_tolerance_rad: f32,
    /// Stop time at the end of the track (ms)
    pub end_of_track_dwell_ms: u32,
    /// Straight drive time toward home (ms)
    pub drive_home_ms: u32,
    /// Fixed power of the join turn
    pub join_command: MotorCommand,
    /// Rotation used when heading is past home (negative direction)
    pub return_turn_negative: MotorCommand,
    /// Rotation used when heading is short of home (positive direction)
    pub return_turn_positive: MotorCommand,
    /// On-line steering law
    pub steering: SteeringConfig,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            period_ms: 30,
            lost_timeout_ms: 1500,
            search_threshold: 0.07,
            lost_threshold: 0.06,
            join_heading_rad: 40.0_f32.to_radians(),
            end_of_track_x_mm: 300.0,
            recovery_overshoot_rad: 0.2,
            return_tolerance_rad: 0.2,
            end_of_track_dwell_ms: 2000,
            drive_home_ms: 15000,
            join_command: MotorCommand::new(25.0, -20.0),
            return_turn_negative: MotorCommand::new(21.0, -21.0),
            return_turn_positive: MotorCommand::new(-21.0, 22.0),
            steering: SteeringConfig::default(),
        }
    }
}

/// Inputs for one navigation tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NavInputs {
    /// Latest line error (positive = line to the left)
    pub e_line: f32,
    /// Latest speed controller output, the default straight command
    pub cruise: MotorCommand,
    /// Dead-reckoned pose
    pub pose: Pose,
    /// Tick time in milliseconds
    pub now_ms: u64,
}

/// Result of one navigation tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavOutput {
    /// State after the tick
    pub state: NavigationState,
    /// Power to apply to the wheels
    pub command: MotorCommand,
    /// On-line indicator level
    pub line_indicator: bool,
    /// Pulse the buzzer once
    pub buzzer_pulse: bool,
    /// Both speed controllers must be reset before the next speed update
    pub reset_speed_controllers: bool,
    /// State change made by this tick
    pub transition: Option<Transition>,
    /// Maneuver still in progress after this tick
    pub maneuver: Option<Maneuver>,
}

impl NavOutput {
    pub(crate) fn stopped(state: NavigationState) -> Self {
        Self {
            state,
            command: MotorCommand::STOP,
            line_indicator: false,
            buzzer_pulse: false,
            reset_speed_controllers: false,
            transition: None,
            maneuver: None,
        }
    }
}
