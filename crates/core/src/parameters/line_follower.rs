//! Line Follower Parameter Definitions
//!
//! Maps the tuning surface of the line follower (sensor timing, speed
//! demand, task periods, navigation thresholds and steering gains) to
//! parameter store entries so a host can adjust them without recompiling.
//!
//! # Parameters
//!
//! - `SENS_CHG_US` - Per-channel charge time (µs)
//! - `SENS_TMO_US` - Discharge timeout (µs)
//! - `SENS_CTR_MIN` - Center reading above which the override may fire (µs)
//! - `SENS_NBR_MAX` - Neighbor reading below which the override may fire (µs)
//! - `SENS_CTR_ERR` - Line error reported by the override
//! - `SPD_DEMAND` - Cruise wheel speed (counts/ms)
//! - `SPD_FILT` - Weight of history in the speed filter
//! - `SCHED_SENS_MS` / `SCHED_SPD_MS` / `SCHED_NAV_MS` - Task periods (ms)
//! - `NAV_LOST_MS` - Lost time before recovery or return (ms)
//! - `NAV_SRCH_THR` / `NAV_LOST_THR` - Line error thresholds
//! - `NAV_JOIN_DEG` - Join turn angle (degrees)
//! - `NAV_EOT_MM` - End-of-track distance (mm)
//! - `NAV_EOT_DWELL` - End-of-track stop time (ms)
//! - `NAV_HOME_MS` - Drive-home time (ms)
//! - `NAV_RET_TOL` - Home alignment tolerance (radians)
//! - `STR_SHARP_THR` / `STR_SHARP_K` - Pivot threshold and gain
//! - `STR_ARC_THR` / `STR_ARC_K` - Arc threshold and gain
//! - `STR_STRAIGHT` - Straight power on the line

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::navigation::{NavigationConfig, SteeringConfig};
use crate::scheduler::ScheduleConfig;
use crate::sensor::LineSensorConfig;
use crate::speed::SpeedConfig;

// --- Defaults ---

const DEFAULT_CHARGE_US: i32 = 10;
const DEFAULT_TIMEOUT_US: i32 = 3000;
const DEFAULT_CENTER_MIN_US: i32 = 1500;
const DEFAULT_NEIGHBOR_MAX_US: i32 = 1000;
const DEFAULT_CENTER_ERROR: f32 = 0.09;
const DEFAULT_SPEED_DEMAND: f32 = 0.3;
const DEFAULT_SPEED_FILTER: f32 = 0.7;
const DEFAULT_SENSOR_PERIOD_MS: i32 = 10;
const DEFAULT_SPEED_PERIOD_MS: i32 = 20;
const DEFAULT_NAV_PERIOD_MS: i32 = 30;
const DEFAULT_LOST_TIMEOUT_MS: i32 = 1500;
const DEFAULT_SEARCH_THRESHOLD: f32 = 0.07;
const DEFAULT_LOST_THRESHOLD: f32 = 0.06;
const DEFAULT_JOIN_ANGLE_DEG: f32 = 40.0;
const DEFAULT_END_OF_TRACK_MM: f32 = 300.0;
const DEFAULT_DWELL_MS: i32 = 2000;
const DEFAULT_DRIVE_HOME_MS: i32 = 15000;
const DEFAULT_RETURN_TOLERANCE: f32 = 0.2;
const DEFAULT_SHARP_THRESHOLD: f32 = 0.20;
const DEFAULT_SHARP_GAIN: f32 = 105.0;
const DEFAULT_ARC_THRESHOLD: f32 = 0.10;
const DEFAULT_ARC_GAIN: f32 = 250.0;
const DEFAULT_STRAIGHT_POWER: f32 = 22.0;

// --- Ranges ---

const MIN_CHARGE_US: i32 = 1;
const MAX_CHARGE_US: i32 = 100;

const MIN_TIMEOUT_US: i32 = 500;
const MAX_TIMEOUT_US: i32 = 10000;

const MIN_OVERRIDE_US: i32 = 0;
const MAX_OVERRIDE_US: i32 = 10000;

const MIN_ERROR: f32 = 0.0;
const MAX_ERROR: f32 = 1.0;

const MIN_SPEED_DEMAND: f32 = 0.0;
const MAX_SPEED_DEMAND: f32 = 2.0;

const MIN_FILTER: f32 = 0.0;
const MAX_FILTER: f32 = 0.99;

// Sensor sampling itself blocks for up to ~3 ms plus charge time
const MIN_SENSOR_PERIOD_MS: i32 = 8;
const MIN_PERIOD_MS: i32 = 1;
const MAX_PERIOD_MS: i32 = 200;

const MIN_LOST_TIMEOUT_MS: i32 = 100;
const MAX_LOST_TIMEOUT_MS: i32 = 10000;

const MIN_JOIN_ANGLE_DEG: f32 = 5.0;
const MAX_JOIN_ANGLE_DEG: f32 = 170.0;

const MIN_DISTANCE_MM: f32 = 0.0;
const MAX_DISTANCE_MM: f32 = 5000.0;

const MIN_DURATION_MS: i32 = 0;
const MAX_DURATION_MS: i32 = 60000;

const MIN_TOLERANCE: f32 = 0.01;
const MAX_TOLERANCE: f32 = 1.0;

const MIN_GAIN: f32 = 0.0;
const MAX_GAIN: f32 = 500.0;

const MIN_POWER: f32 = 0.0;
const MAX_POWER: f32 = 255.0;

/// Line follower parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct LineFollowerParams {
    /// Per-channel charge time (µs)
    pub charge_us: i32,
    /// Discharge timeout (µs)
    pub timeout_us: i32,
    /// Center reading above which the centered override may fire (µs)
    pub center_min_us: i32,
    /// Neighbor reading below which the centered override may fire (µs)
    pub neighbor_max_us: i32,
    /// Line error reported by the centered override
    pub center_error: f32,
    /// Cruise wheel speed (counts/ms)
    pub speed_demand: f32,
    /// Weight of history in the speed filter
    pub speed_filter: f32,
    /// Sensor task period (ms)
    pub sensor_period_ms: i32,
    /// Speed task period (ms)
    pub speed_period_ms: i32,
    /// Navigation task period (ms)
    pub nav_period_ms: i32,
    /// Lost time before recovery or return (ms)
    pub lost_timeout_ms: i32,
    /// |e_line| below which searching continues
    pub search_threshold: f32,
    /// |e_line| below which the line is lost
    pub lost_threshold: f32,
    /// Join turn angle (degrees)
    pub join_angle_deg: f32,
    /// End-of-track distance (mm)
    pub end_of_track_mm: f32,
    /// End-of-track stop time (ms)
    pub dwell_ms: i32,
    /// Drive-home time (ms)
    pub drive_home_ms: i32,
    /// Home alignment tolerance (radians)
    pub return_tolerance: f32,
    /// Pivot threshold
    pub sharp_threshold: f32,
    /// Pivot gain
    pub sharp_gain: f32,
    /// Arc threshold
    pub arc_threshold: f32,
    /// Arc gain
    pub arc_gain: f32,
    /// Straight power on the line
    pub straight_power: f32,
}

impl Default for LineFollowerParams {
    fn default() -> Self {
        Self {
            charge_us: DEFAULT_CHARGE_US,
            timeout_us: DEFAULT_TIMEOUT_US,
            center_min_us: DEFAULT_CENTER_MIN_US,
            neighbor_max_us: DEFAULT_NEIGHBOR_MAX_US,
            center_error: DEFAULT_CENTER_ERROR,
            speed_demand: DEFAULT_SPEED_DEMAND,
            speed_filter: DEFAULT_SPEED_FILTER,
            sensor_period_ms: DEFAULT_SENSOR_PERIOD_MS,
            speed_period_ms: DEFAULT_SPEED_PERIOD_MS,
            nav_period_ms: DEFAULT_NAV_PERIOD_MS,
            lost_timeout_ms: DEFAULT_LOST_TIMEOUT_MS,
            search_threshold: DEFAULT_SEARCH_THRESHOLD,
            lost_threshold: DEFAULT_LOST_THRESHOLD,
            join_angle_deg: DEFAULT_JOIN_ANGLE_DEG,
            end_of_track_mm: DEFAULT_END_OF_TRACK_MM,
            dwell_ms: DEFAULT_DWELL_MS,
            drive_home_ms: DEFAULT_DRIVE_HOME_MS,
            return_tolerance: DEFAULT_RETURN_TOLERANCE,
            sharp_threshold: DEFAULT_SHARP_THRESHOLD,
            sharp_gain: DEFAULT_SHARP_GAIN,
            arc_threshold: DEFAULT_ARC_THRESHOLD,
            arc_gain: DEFAULT_ARC_GAIN,
            straight_power: DEFAULT_STRAIGHT_POWER,
        }
    }
}

impl LineFollowerParams {
    /// Register line follower parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let ints = [
            ("SENS_CHG_US", DEFAULT_CHARGE_US),
            ("SENS_TMO_US", DEFAULT_TIMEOUT_US),
            ("SENS_CTR_MIN", DEFAULT_CENTER_MIN_US),
            ("SENS_NBR_MAX", DEFAULT_NEIGHBOR_MAX_US),
            ("SCHED_SENS_MS", DEFAULT_SENSOR_PERIOD_MS),
            ("SCHED_SPD_MS", DEFAULT_SPEED_PERIOD_MS),
            ("SCHED_NAV_MS", DEFAULT_NAV_PERIOD_MS),
            ("NAV_LOST_MS", DEFAULT_LOST_TIMEOUT_MS),
            ("NAV_EOT_DWELL", DEFAULT_DWELL_MS),
            ("NAV_HOME_MS", DEFAULT_DRIVE_HOME_MS),
        ];
        for (name, value) in ints {
            store.register(name, ParamValue::Int(value), ParamFlags::empty())?;
        }

        let floats = [
            ("SENS_CTR_ERR", DEFAULT_CENTER_ERROR),
            ("SPD_DEMAND", DEFAULT_SPEED_DEMAND),
            ("SPD_FILT", DEFAULT_SPEED_FILTER),
            ("NAV_SRCH_THR", DEFAULT_SEARCH_THRESHOLD),
            ("NAV_LOST_THR", DEFAULT_LOST_THRESHOLD),
            ("NAV_JOIN_DEG", DEFAULT_JOIN_ANGLE_DEG),
            ("NAV_EOT_MM", DEFAULT_END_OF_TRACK_MM),
            ("NAV_RET_TOL", DEFAULT_RETURN_TOLERANCE),
            ("STR_SHARP_THR", DEFAULT_SHARP_THRESHOLD),
            ("STR_SHARP_K", DEFAULT_SHARP_GAIN),
            ("STR_ARC_THR", DEFAULT_ARC_THRESHOLD),
            ("STR_ARC_K", DEFAULT_ARC_GAIN),
            ("STR_STRAIGHT", DEFAULT_STRAIGHT_POWER),
        ];
        for (name, value) in floats {
            store.register(name, ParamValue::Float(value), ParamFlags::empty())?;
        }

        Ok(())
    }

    /// Load line follower parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            charge_us: load_int(
                store,
                "SENS_CHG_US",
                DEFAULT_CHARGE_US,
                MIN_CHARGE_US,
                MAX_CHARGE_US,
            ),
            timeout_us: load_int(
                store,
                "SENS_TMO_US",
                DEFAULT_TIMEOUT_US,
                MIN_TIMEOUT_US,
                MAX_TIMEOUT_US,
            ),
            center_min_us: load_int(
                store,
                "SENS_CTR_MIN",
                DEFAULT_CENTER_MIN_US,
                MIN_OVERRIDE_US,
                MAX_OVERRIDE_US,
            ),
            neighbor_max_us: load_int(
                store,
                "SENS_NBR_MAX",
                DEFAULT_NEIGHBOR_MAX_US,
                MIN_OVERRIDE_US,
                MAX_OVERRIDE_US,
            ),
            center_error: load_float(
                store,
                "SENS_CTR_ERR",
                DEFAULT_CENTER_ERROR,
                MIN_ERROR,
                MAX_ERROR,
            ),
            speed_demand: load_float(
                store,
                "SPD_DEMAND",
                DEFAULT_SPEED_DEMAND,
                MIN_SPEED_DEMAND,
                MAX_SPEED_DEMAND,
            ),
            speed_filter: load_float(
                store,
                "SPD_FILT",
                DEFAULT_SPEED_FILTER,
                MIN_FILTER,
                MAX_FILTER,
            ),
            sensor_period_ms: load_int(
                store,
                "SCHED_SENS_MS",
                DEFAULT_SENSOR_PERIOD_MS,
                MIN_SENSOR_PERIOD_MS,
                MAX_PERIOD_MS,
            ),
            speed_period_ms: load_int(
                store,
                "SCHED_SPD_MS",
                DEFAULT_SPEED_PERIOD_MS,
                MIN_PERIOD_MS,
                MAX_PERIOD_MS,
            ),
            nav_period_ms: load_int(
                store,
                "SCHED_NAV_MS",
                DEFAULT_NAV_PERIOD_MS,
                MIN_PERIOD_MS,
                MAX_PERIOD_MS,
            ),
            lost_timeout_ms: load_int(
                store,
                "NAV_LOST_MS",
                DEFAULT_LOST_TIMEOUT_MS,
                MIN_LOST_TIMEOUT_MS,
                MAX_LOST_TIMEOUT_MS,
            ),
            search_threshold: load_float(
                store,
                "NAV_SRCH_THR",
                DEFAULT_SEARCH_THRESHOLD,
                MIN_ERROR,
                MAX_ERROR,
            ),
            lost_threshold: load_float(
                store,
                "NAV_LOST_THR",
                DEFAULT_LOST_THRESHOLD,
                MIN_ERROR,
                MAX_ERROR,
            ),
            join_angle_deg: load_float(
                store,
                "NAV_JOIN_DEG",
                DEFAULT_JOIN_ANGLE_DEG,
                MIN_JOIN_ANGLE_DEG,
                MAX_JOIN_ANGLE_DEG,
            ),
            end_of_track_mm: load_float(
                store,
                "NAV_EOT_MM",
                DEFAULT_END_OF_TRACK_MM,
                MIN_DISTANCE_MM,
                MAX_DISTANCE_MM,
            ),
            dwell_ms: load_int(
                store,
                "NAV_EOT_DWELL",
                DEFAULT_DWELL_MS,
                MIN_DURATION_MS,
                MAX_DURATION_MS,
            ),
            drive_home_ms: load_int(
                store,
                "NAV_HOME_MS",
                DEFAULT_DRIVE_HOME_MS,
                MIN_DURATION_MS,
                MAX_DURATION_MS,
            ),
            return_tolerance: load_float(
                store,
                "NAV_RET_TOL",
                DEFAULT_RETURN_TOLERANCE,
                MIN_TOLERANCE,
                MAX_TOLERANCE,
            ),
            sharp_threshold: load_float(
                store,
                "STR_SHARP_THR",
                DEFAULT_SHARP_THRESHOLD,
                MIN_ERROR,
                MAX_ERROR,
            ),
            sharp_gain: load_float(
                store,
                "STR_SHARP_K",
                DEFAULT_SHARP_GAIN,
                MIN_GAIN,
                MAX_GAIN,
            ),
            arc_threshold: load_float(
                store,
                "STR_ARC_THR",
                DEFAULT_ARC_THRESHOLD,
                MIN_ERROR,
                MAX_ERROR,
            ),
            arc_gain: load_float(store, "STR_ARC_K", DEFAULT_ARC_GAIN, MIN_GAIN, MAX_GAIN),
            straight_power: load_float(
                store,
                "STR_STRAIGHT",
                DEFAULT_STRAIGHT_POWER,
                MIN_POWER,
                MAX_POWER,
            ),
        }
    }

    /// Validate line follower parameters
    pub fn is_valid(&self) -> bool {
        // Range checks
        if self.charge_us < MIN_CHARGE_US || self.charge_us > MAX_CHARGE_US {
            return false;
        }
        if self.timeout_us < MIN_TIMEOUT_US || self.timeout_us > MAX_TIMEOUT_US {
            return false;
        }
        if self.speed_filter < MIN_FILTER || self.speed_filter > MAX_FILTER {
            return false;
        }
        if self.sensor_period_ms < MIN_SENSOR_PERIOD_MS || self.sensor_period_ms > MAX_PERIOD_MS {
            return false;
        }
        if self.speed_period_ms < MIN_PERIOD_MS || self.nav_period_ms < MIN_PERIOD_MS {
            return false;
        }
        if self.join_angle_deg < MIN_JOIN_ANGLE_DEG || self.join_angle_deg > MAX_JOIN_ANGLE_DEG {
            return false;
        }
        if self.return_tolerance < MIN_TOLERANCE || self.return_tolerance > MAX_TOLERANCE {
            return false;
        }

        // Consistency: the override must look for a dark center between light neighbors
        if self.center_min_us <= self.neighbor_max_us {
            return false;
        }

        // Consistency: searching must stop before the line would count as lost
        if self.lost_threshold > self.search_threshold {
            return false;
        }

        // Consistency: the pivot tier sits above the arc tier
        if self.sharp_threshold < self.arc_threshold {
            return false;
        }

        // Sampling blocks for the whole timeout, which must fit in a sensor period
        let worst_case_us = self.charge_us * 5 + self.timeout_us;
        if worst_case_us > self.sensor_period_ms * 1000 {
            return false;
        }

        true
    }

    /// Convert to `LineSensorConfig`
    pub fn to_sensor_config(&self) -> LineSensorConfig {
        LineSensorConfig {
            charge_us: self.charge_us.max(0) as u32,
            timeout_us: self.timeout_us.max(0) as u32,
            override_center_min_us: self.center_min_us.max(0) as u32,
            override_neighbor_max_us: self.neighbor_max_us.max(0) as u32,
            override_error: self.center_error,
        }
    }

    /// Convert to `SpeedConfig`
    pub fn to_speed_config(&self) -> SpeedConfig {
        SpeedConfig {
            demand: self.speed_demand,
            history_weight: self.speed_filter,
        }
    }

    /// Convert to `ScheduleConfig`, keeping default task budgets
    pub fn to_schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            line_sensor_period_ms: self.sensor_period_ms.max(0) as u32,
            speed_period_ms: self.speed_period_ms.max(0) as u32,
            navigation_period_ms: self.nav_period_ms.max(0) as u32,
            line_sensor_budget_us: (self.charge_us * 5 + self.timeout_us).max(0) as u32 + 150,
            ..ScheduleConfig::default()
        }
    }

    /// Convert to `NavigationConfig`, keeping default fixed turn powers
    pub fn to_nav_config(&self) -> NavigationConfig {
        NavigationConfig {
            period_ms: self.nav_period_ms.max(0) as u32,
            lost_timeout_ms: self.lost_timeout_ms.max(0) as u32,
            search_threshold: self.search_threshold,
            lost_threshold: self.lost_threshold,
            join_heading_rad: self.join_angle_deg.to_radians(),
            end_of_track_x_mm: self.end_of_track_mm,
            end_of_track_dwell_ms: self.dwell_ms.max(0) as u32,
            drive_home_ms: self.drive_home_ms.max(0) as u32,
            return_tolerance_rad: self.return_tolerance,
            steering: SteeringConfig {
                sharp_threshold: self.sharp_threshold,
                sharp_gain: self.sharp_gain,
                arc_threshold: self.arc_threshold,
                arc_gain: self.arc_gain,
                straight_power: self.straight_power,
                ..SteeringConfig::default()
            },
            ..NavigationConfig::default()
        }
    }
}

/// Load a float parameter from store with clamping
fn load_float(store: &ParameterStore, name: &str, default: f32, min: f32, max: f32) -> f32 {
    match store.get(name) {
        Some(ParamValue::Float(v)) => v.clamp(min, max),
        Some(ParamValue::Int(v)) => (*v as f32).clamp(min, max),
        _ => default,
    }
}

/// Load an integer parameter from store with clamping
fn load_int(store: &ParameterStore, name: &str, default: i32, min: i32, max: i32) -> i32 {
    match store.get(name) {
        Some(ParamValue::Int(v)) => (*v).clamp(min, max),
        Some(ParamValue::Float(v)) => (*v as i32).clamp(min, max),
        _ => default,
    }
}
