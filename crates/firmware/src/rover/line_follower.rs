//! Line follower control loop
//!
//! Owns every control component and the hardware they act on. Each call to
//! [`LineFollower::run_once`] is one pass of the cooperative loop:
//!
//! 1. Advance the pose estimate
//! 2. Read the clock once and ask the scheduler which tasks are due
//! 3. Run the due tasks to completion in fixed order (line sensor, speed
//!    control, navigation), stamping each with its completion time
//!
//! Maneuvers are stepped by the navigation task, so line sensing and speed
//! control keep running while the robot turns or drives home.
//!
//! # Error handling
//!
//! A sensor timeout is not an error of the pass: the line error keeps its
//! previous value and the fault is counted. Channel I/O and motor failures
//! are returned after the remaining due tasks have run; [`run_forever`]
//! logs them and carries on with the next pass.
//!
//! [`run_forever`]: LineFollower::run_forever

use core::fmt;

use embedded_hal::delay::DelayNs;

use super::telemetry::Telemetry;
use crate::core::motor::{DriveMotors, MotorError};
use crate::core::navigation::{Maneuver, NavInputs, Navigator};
use crate::core::parameters::{LineFollowerParams, ParameterStore};
use crate::core::scheduler::{Scheduler, TaskId, TaskSet};
use crate::core::sensor::{
    DischargeChannel, IrEmitter, LineSensorArray, SensorFault, CHANNEL_COUNT,
};
use crate::core::speed::{EncoderCounters, SpeedController, SpeedEstimator};
use crate::core::traits::{Indicators, PoseEstimator, TimeSource};
use crate::{log_debug, log_error, log_info, log_warn};

/// Failure of one control loop pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError<SE> {
    /// A line sensor channel could not be charged or released
    Sensor {
        /// Channel index (0 = leftest)
        index: usize,
        /// Pin error
        error: SE,
    },
    /// The drive rejected a motor command
    Motor(MotorError),
}

impl<SE> ControlError<SE> {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ControlError::Sensor { .. } => "sensor_channel",
            ControlError::Motor(_) => "motor",
        }
    }
}

impl<SE: fmt::Debug> fmt::Display for ControlError<SE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Sensor { index, error } => {
                write!(f, "line sensor channel {} failed: {:?}", index, error)
            }
            ControlError::Motor(e) => write!(f, "motor command failed: {}", e),
        }
    }
}

impl<SE> From<MotorError> for ControlError<SE> {
    fn from(e: MotorError) -> Self {
        ControlError::Motor(e)
    }
}

/// Hardware and collaborators handed to [`LineFollower::new`]
pub struct Hardware<C, X, T, D, M, P, E, I> {
    /// Reflectance channels, leftest first
    pub channels: [C; CHANNEL_COUNT],
    /// IR emitter lighting the channels
    pub emitter: X,
    /// Monotonic clock
    pub time: T,
    /// Delay used for the sensor charge time
    pub delay: D,
    /// Differential drive
    pub motors: M,
    /// Dead-reckoning pose estimator
    pub pose: P,
    /// Wheel encoder counters
    pub encoders: E,
    /// LED and buzzer
    pub indicators: I,
}

/// Line follower control loop context
pub struct LineFollower<C, X, T, D, M, P, E, I, S>
where
    C: DischargeChannel,
    X: IrEmitter,
    T: TimeSource,
    D: DelayNs,
    M: DriveMotors,
    P: PoseEstimator,
    E: EncoderCounters,
    I: Indicators,
    S: SpeedController,
{
    sensors: LineSensorArray<C, T, D>,
    emitter: X,
    time: T,
    motors: M,
    pose: P,
    encoders: E,
    indicators: I,
    speed: SpeedEstimator<S>,
    scheduler: Scheduler,
    navigator: Navigator,
    telemetry: Telemetry,
}

impl<C, X, T, D, M, P, E, I, S> LineFollower<C, X, T, D, M, P, E, I, S>
where
    C: DischargeChannel,
    X: IrEmitter,
    T: TimeSource,
    D: DelayNs,
    M: DriveMotors,
    P: PoseEstimator,
    E: EncoderCounters,
    I: Indicators,
    S: SpeedController,
{
    /// Build the control loop and switch the IR emitter on
    ///
    /// Invalid parameters are replaced by the defaults. An emitter that
    /// cannot be lit is logged; `telemetry().emitter_on` stays false.
    pub fn new(
        hardware: Hardware<C, X, T, D, M, P, E, I>,
        left_pid: S,
        right_pid: S,
        params: &LineFollowerParams,
    ) -> Self {
        let defaults;
        let params = if params.is_valid() {
            params
        } else {
            log_warn!("line follower parameters invalid, using defaults");
            defaults = LineFollowerParams::default();
            &defaults
        };

        let Hardware {
            channels,
            emitter,
            time,
            delay,
            motors,
            pose,
            encoders,
            indicators,
        } = hardware;

        let initial = encoders.snapshot();
        let sensors = LineSensorArray::new(channels, time.clone(), delay, params.to_sensor_config());
        let speed = SpeedEstimator::new(left_pid, right_pid, initial, &params.to_speed_config());

        let mut follower = Self {
            sensors,
            emitter,
            time,
            motors,
            pose,
            encoders,
            indicators,
            speed,
            scheduler: Scheduler::new(&params.to_schedule_config()),
            navigator: Navigator::new(params.to_nav_config()),
            telemetry: Telemetry::new(),
        };
        if follower.enable_emitter().is_err() {
            log_error!("IR emitter could not be switched on");
        }
        follower
    }

    /// Build the control loop from stored parameters
    ///
    /// Out-of-range values are clamped by [`LineFollowerParams::from_store`].
    pub fn from_store(
        hardware: Hardware<C, X, T, D, M, P, E, I>,
        left_pid: S,
        right_pid: S,
        store: &ParameterStore,
    ) -> Self {
        Self::new(
            hardware,
            left_pid,
            right_pid,
            &LineFollowerParams::from_store(store),
        )
    }

    /// Switch the IR emitter on
    ///
    /// # Errors
    ///
    /// Returns the emitter's pin error.
    pub fn enable_emitter(&mut self) -> Result<(), X::Error> {
        self.emitter.enable()?;
        self.telemetry.emitter_on = true;
        Ok(())
    }

    /// Switch the IR emitter off
    ///
    /// # Errors
    ///
    /// Returns the emitter's pin error.
    pub fn disable_emitter(&mut self) -> Result<(), X::Error> {
        self.emitter.disable()?;
        self.telemetry.emitter_on = false;
        Ok(())
    }

    /// Run one pass of the control loop
    ///
    /// Returns the set of tasks that ran.
    ///
    /// # Errors
    ///
    /// Returns the first channel or motor failure of the pass. Every due
    /// task still runs.
    pub fn run_once(&mut self) -> Result<TaskSet, ControlError<C::Error>> {
        self.pose.update();

        let now_ms = self.time.now_ms();
        let due = self.scheduler.poll(now_ms);
        let mut first_error = None;

        for task in TaskId::ALL {
            if !due.contains(task.as_set()) {
                continue;
            }

            let started_us = self.time.now_us();
            let result = match task {
                TaskId::LineSensor => self.run_line_sensor(),
                TaskId::SpeedControl => {
                    self.run_speed_control(now_ms);
                    Ok(())
                }
                TaskId::Navigation => self.run_navigation(now_ms),
            };
            let finished_us = self.time.now_us();

            let execution_us = finished_us
                .saturating_sub(started_us)
                .min(u64::from(u32::MAX)) as u32;
            self.scheduler
                .complete(task, finished_us / 1000, execution_us);

            if let Err(e) = result {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        self.telemetry.note_pass();

        match first_error {
            Some(e) => Err(e),
            None => Ok(due),
        }
    }

    /// Run the control loop forever, logging failed passes
    pub fn run_forever(&mut self) -> ! {
        log_info!("line follower started");
        loop {
            if let Err(_e) = self.run_once() {
                log_error!("control pass failed: {}", _e.kind());
            }
        }
    }

    fn run_line_sensor(&mut self) -> Result<(), ControlError<C::Error>> {
        match self.sensors.sample() {
            Ok(reading) => {
                self.telemetry.e_line = reading.e_line;
                self.telemetry.line_source = Some(reading.source);
                Ok(())
            }
            Err(SensorFault::AllChannelsTimedOut) => {
                // e_line keeps its previous value
                self.telemetry.note_sensor_fault();
                log_warn!("no line sensor channel discharged");
                Ok(())
            }
            Err(SensorFault::Channel { index, error }) => {
                self.telemetry.note_sensor_fault();
                log_warn!("line sensor channel {} failed", index);
                Err(ControlError::Sensor { index, error })
            }
        }
    }

    fn run_speed_control(&mut self, now_ms: u64) {
        let elapsed_ms = self.scheduler.elapsed_ms(TaskId::SpeedControl, now_ms);
        let counts = self.encoders.snapshot();
        self.telemetry.speeds = self.speed.update(counts, elapsed_ms);
    }

    fn run_navigation(&mut self, now_ms: u64) -> Result<(), ControlError<C::Error>> {
        let previous = self.navigator.maneuver();
        let inputs = NavInputs {
            e_line: self.telemetry.e_line,
            cruise: self.speed.cruise_command(),
            pose: self.pose.pose(),
            now_ms,
        };
        let out = self.navigator.tick(&inputs);

        if let Some(transition) = out.transition {
            log_info!(
                "navigation {} -> {}",
                transition.from.name(),
                transition.to.name()
            );
            self.telemetry.record_transition(transition, now_ms);
        }
        self.track_maneuver(previous, out.maneuver, now_ms);

        if self.telemetry.home_heading.is_none() {
            if let Some(_heading) = self.navigator.home_heading() {
                log_info!("home heading {} rad", _heading);
                self.telemetry.home_heading = Some(_heading);
            }
        }

        if out.reset_speed_controllers {
            self.speed.reset_controllers();
            self.telemetry.note_controller_reset();
            log_debug!("speed controllers reset");
        }

        self.indicators.set_line_indicator(out.line_indicator);
        if out.buzzer_pulse {
            self.indicators.pulse_buzzer();
            self.telemetry.note_buzzer_pulse();
        }

        self.telemetry.state = out.state;
        self.telemetry.lost_line_count = self.navigator.lost_line_count();
        self.telemetry.maneuver = out.maneuver;
        self.telemetry.last_command = out.command;

        if let Err(e) = self.motors.apply(out.command) {
            self.telemetry.note_motor_fault();
            log_warn!("motor command rejected");
            return Err(e.into());
        }
        Ok(())
    }

    fn track_maneuver(&mut self, previous: Option<Maneuver>, current: Option<Maneuver>, now_ms: u64) {
        match (previous, current) {
            (None, Some(_m)) => {
                self.telemetry.maneuver_started(now_ms);
                log_info!("maneuver {} started", _m.name());
            }
            (Some(_m), None) => {
                let _duration_ms = self.telemetry.maneuver_finished(now_ms);
                log_info!("maneuver {} finished after {} ms", _m.name(), _duration_ms);
            }
            _ => {}
        }
    }

    /// Control loop telemetry
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Task scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Navigation state machine
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Line sensor array
    pub fn sensors(&self) -> &LineSensorArray<C, T, D> {
        &self.sensors
    }

    /// IR emitter
    pub fn emitter(&self) -> &X {
        &self.emitter
    }
}
