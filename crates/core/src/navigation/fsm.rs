//! Line-following navigation state machine
//!
//! [`Navigator::tick`] is called once per navigation period. It first steps
//! any maneuver in progress; while one runs, no transitions are evaluated.
//! Otherwise transitions are evaluated in fixed priority order and the
//! behaviour of the resulting state produces the tick's motor command and
//! indicator levels.
//!
//! # Transition priority
//!
//! 1. `Home` is terminal
//! 2. `Return` aligns with the home heading, then drives home
//! 3. `Join` turns in place until the heading magnitude reaches the join angle
//! 4. Lost for longer than the timeout: recovery turn or end of track
//! 5. `Search` while the line error stays small
//! 6. `Search` otherwise becomes `Join`
//! 7. Small line error means `Lost`, anything else `OnLine`

use core::f32::consts::PI;

use super::heading::home_heading;
use super::state::{Maneuver, NavigationState, Transition};
use super::steering::on_line_command;
use super::types::{NavInputs, NavOutput, NavigationConfig};
use crate::motor::MotorCommand;

/// Navigation state machine
///
/// Owns the navigation state, the consecutive lost-tick counter, the lazily
/// computed home heading and the maneuver in progress. Given the same
/// starting state and inputs, `tick` always produces the same output.
#[derive(Clone, Debug)]
pub struct Navigator {
    config: NavigationConfig,
    state: NavigationState,
    lost_line_count: u32,
    home_heading: Option<f32>,
    maneuver: Option<Maneuver>,
}

impl Navigator {
    /// Create a navigator in `Search`
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            state: NavigationState::Search,
            lost_line_count: 0,
            home_heading: None,
            maneuver: None,
        }
    }

    /// Current state
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Consecutive navigation ticks spent in `Lost`
    pub fn lost_line_count(&self) -> u32 {
        self.lost_line_count
    }

    /// Home heading, once computed on entering `Return`
    pub fn home_heading(&self) -> Option<f32> {
        self.home_heading
    }

    /// Maneuver in progress
    pub fn maneuver(&self) -> Option<Maneuver> {
        self.maneuver
    }

    /// Active configuration
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// True when the robot has been lost for longer than the lost timeout
    pub fn lost_timeout_elapsed(&self) -> bool {
        u64::from(self.lost_line_count) * u64::from(self.config.period_ms)
            > u64::from(self.config.lost_timeout_ms)
    }

    /// Run one navigation tick
    pub fn tick(&mut self, inputs: &NavInputs) -> NavOutput {
        let from = self.state;

        let mut out = match self.maneuver {
            Some(maneuver) => self.step_maneuver(maneuver, inputs),
            None => self.evaluate(inputs),
        };

        out.state = self.state;
        out.maneuver = self.maneuver;
        if from != self.state {
            out.transition = Some(Transition {
                from,
                to: self.state,
            });
        }
        out
    }

    fn step_maneuver(&mut self, maneuver: Maneuver, inputs: &NavInputs) -> NavOutput {
        match maneuver {
            Maneuver::RecoveryTurn {
                target_heading,
                command,
            } => {
                if inputs.pose.heading >= target_heading {
                    self.maneuver = None;
                    self.lost_line_count = 0;
                    self.state = NavigationState::Lost;
                    NavOutput::stopped(self.state)
                } else {
                    self.output(command, false)
                }
            }
            Maneuver::EndOfTrackDwell { until_ms } => {
                if inputs.now_ms >= until_ms {
                    self.maneuver = None;
                    self.state = NavigationState::Return;
                }
                NavOutput::stopped(self.state)
            }
            Maneuver::DriveHome { until_ms } => {
                if inputs.now_ms >= until_ms {
                    self.maneuver = None;
                    self.state = NavigationState::Home;
                    NavOutput::stopped(self.state)
                } else {
                    self.output(inputs.cruise, true)
                }
            }
        }
    }

    fn evaluate(&mut self, inputs: &NavInputs) -> NavOutput {
        let e = libm::fabsf(inputs.e_line);

        match self.state {
            NavigationState::Home => return NavOutput::stopped(self.state),
            NavigationState::Return => return self.step_return(inputs),
            NavigationState::Join => return self.step_join(inputs),
            _ => {}
        }

        if self.lost_timeout_elapsed() {
            return self.disambiguate_lost(inputs);
        }

        match self.state {
            NavigationState::Search if e < self.config.search_threshold => {
                self.output(inputs.cruise, false)
            }
            NavigationState::Search => {
                self.state = NavigationState::Join;
                self.output(self.config.join_command, true)
            }
            _ if e < self.config.lost_threshold => {
                self.state = NavigationState::Lost;
                self.lost_line_count = self.lost_line_count.saturating_add(1);
                let mut out = self.output(inputs.cruise, false);
                out.buzzer_pulse = true;
                out
            }
            _ => self.enter_on_line(inputs),
        }
    }

    fn enter_on_line(&mut self, inputs: &NavInputs) -> NavOutput {
        self.state = NavigationState::OnLine;
        self.lost_line_count = 0;
        let command = on_line_command(inputs.e_line, &self.config.steering);
        self.output(command, true)
    }

    fn step_join(&mut self, inputs: &NavInputs) -> NavOutput {
        if libm::fabsf(inputs.pose.heading) >= self.config.join_heading_rad {
            self.enter_on_line(inputs)
        } else {
            self.output(self.config.join_command, true)
        }
    }

    fn disambiguate_lost(&mut self, inputs: &NavInputs) -> NavOutput {
        if libm::fabsf(inputs.pose.x) < self.config.end_of_track_x_mm {
            let target_heading = inputs.pose.heading + PI - self.config.recovery_overshoot_rad;
            // Frozen for the whole turn; the controllers are reset below
            let command = MotorCommand::new(-inputs.cruise.left, inputs.cruise.right);
            self.maneuver = Some(Maneuver::RecoveryTurn {
                target_heading,
                command,
            });
            let mut out = self.output(command, false);
            out.reset_speed_controllers = true;
            out
        } else {
            // lost_line_count stays; Return never looks at it
            let until_ms = inputs
                .now_ms
                .saturating_add(u64::from(self.config.end_of_track_dwell_ms));
            self.maneuver = Some(Maneuver::EndOfTrackDwell { until_ms });
            NavOutput::stopped(self.state)
        }
    }

    fn step_return(&mut self, inputs: &NavInputs) -> NavOutput {
        let home = *self
            .home_heading
            .get_or_insert_with(|| home_heading(&inputs.pose));
        let heading = inputs.pose.heading;
        let tolerance = self.config.return_tolerance_rad;

        if heading > home + tolerance {
            self.output(self.config.return_turn_negative, true)
        } else if heading < home - tolerance {
            self.output(self.config.return_turn_positive, true)
        } else {
            let until_ms = inputs
                .now_ms
                .saturating_add(u64::from(self.config.drive_home_ms));
            self.maneuver = Some(Maneuver::DriveHome { until_ms });
            let mut out = self.output(inputs.cruise, true);
            out.reset_speed_controllers = true;
            out
        }
    }

    fn output(&self, command: MotorCommand, line_indicator: bool) -> NavOutput {
        NavOutput {
            command,
            line_indicator,
            ..NavOutput::stopped(self.state)
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Pose;

    const CRUISE: MotorCommand = MotorCommand::new(30.0, 31.0);

    fn inputs(e_line: f32, pose: Pose, now_ms: u64) -> NavInputs {
        NavInputs {
            e_line,
            cruise: CRUISE,
            pose,
            now_ms,
        }
    }

    fn navigator_in(state: NavigationState) -> Navigator {
        let mut nav = Navigator::default();
        nav.state = state;
        nav
    }

    #[test]
    fn test_search_drives_cruise_until_line_seen() {
        let mut nav = Navigator::default();
        let out = nav.tick(&inputs(0.05, Pose::default(), 31));
        assert_eq!(out.state, NavigationState::Search);
        assert_eq!(out.command, CRUISE);
        assert!(!out.line_indicator);
        assert!(out.transition.is_none());

        let out = nav.tick(&inputs(0.3, Pose::default(), 62));
        assert_eq!(out.state, NavigationState::Join);
        assert_eq!(out.command, MotorCommand::new(25.0, -20.0));
        assert!(out.line_indicator);
        assert_eq!(
            out.transition,
            Some(Transition {
                from: NavigationState::Search,
                to: NavigationState::Join
            })
        );
    }

    #[test]
    fn test_search_threshold_boundary() {
        let mut nav = Navigator::default();
        // 0.07 is not below the search threshold
        let out = nav.tick(&inputs(-0.07, Pose::default(), 31));
        assert_eq!(out.state, NavigationState::Join);
    }

    #[test]
    fn test_join_turns_until_forty_degrees() {
        let mut nav = navigator_in(NavigationState::Join);

        let out = nav.tick(&inputs(0.0, Pose::new(-0.3, 0.0, 0.0), 31));
        assert_eq!(out.state, NavigationState::Join);
        assert_eq!(out.command, MotorCommand::new(25.0, -20.0));

        // Join exits regardless of the line error
        let out = nav.tick(&inputs(0.0, Pose::new(-0.70, 0.0, 0.0), 62));
        assert_eq!(out.state, NavigationState::OnLine);
        assert!(out.line_indicator);
        assert_eq!(out.command, MotorCommand::straight(22.0));
    }

    #[test]
    fn test_on_line_sharp_turn() {
        let mut nav = navigator_in(NavigationState::OnLine);
        let out = nav.tick(&inputs(0.5, Pose::default(), 31));
        assert_eq!(out.state, NavigationState::OnLine);
        assert!((out.command.left - 0.0).abs() < 1e-4);
        assert!((out.command.right - 52.5).abs() < 1e-4);
        assert!(out.line_indicator);
    }

    #[test]
    fn test_lost_increments_and_pulses_buzzer() {
        let mut nav = navigator_in(NavigationState::OnLine);
        let out = nav.tick(&inputs(0.05, Pose::default(), 31));
        assert_eq!(out.state, NavigationState::Lost);
        assert_eq!(out.command, CRUISE);
        assert!(!out.line_indicator);
        assert!(out.buzzer_pulse);
        assert_eq!(nav.lost_line_count(), 1);

        let out = nav.tick(&inputs(-0.02, Pose::default(), 62));
        assert!(out.transition.is_none());
        assert_eq!(nav.lost_line_count(), 2);
    }

    #[test]
    fn test_on_line_resets_lost_count() {
        let mut nav = navigator_in(NavigationState::OnLine);
        for i in 0..10 {
            nav.tick(&inputs(0.01, Pose::default(), i * 31));
        }
        assert_eq!(nav.lost_line_count(), 10);

        let out = nav.tick(&inputs(0.15, Pose::default(), 400));
        assert_eq!(out.state, NavigationState::OnLine);
        assert_eq!(nav.lost_line_count(), 0);
    }

    #[test]
    fn test_lost_timeout_needs_more_than_fifty_ticks() {
        let mut nav = navigator_in(NavigationState::OnLine);
        let pose = Pose::new(0.0, 100.0, 0.0);

        for i in 0..50 {
            nav.tick(&inputs(0.05, pose, i * 31));
        }
        assert_eq!(nav.lost_line_count(), 50);
        // 50 * 30 = 1500 is not past the timeout
        assert!(!nav.lost_timeout_elapsed());

        nav.tick(&inputs(0.05, pose, 50 * 31));
        assert_eq!(nav.lost_line_count(), 51);
        assert!(nav.lost_timeout_elapsed());
        assert!(nav.maneuver().is_none());

        // The next tick evaluates the disambiguation instead of counting
        let out = nav.tick(&inputs(0.05, pose, 51 * 31));
        assert!(matches!(
            out.maneuver,
            Some(Maneuver::RecoveryTurn { .. })
        ));
        assert_eq!(nav.lost_line_count(), 51);
    }

    #[test]
    fn test_recovery_turn_near_start() {
        let mut nav = navigator_in(NavigationState::Lost);
        nav.lost_line_count = 51;

        let out = nav.tick(&inputs(0.0, Pose::new(0.5, 120.0, 10.0), 1000));
        assert!(out.reset_speed_controllers);
        // Cruise (30, 31) with the left wheel reversed
        assert_eq!(out.command, MotorCommand::new(-30.0, 31.0));
        let target = match out.maneuver {
            Some(Maneuver::RecoveryTurn { target_heading, .. }) => target_heading,
            other => panic!("unexpected maneuver {:?}", other),
        };
        assert!((target - (0.5 + PI - 0.2)).abs() < 1e-5);

        // Line error is ignored while turning
        let out = nav.tick(&inputs(0.9, Pose::new(2.0, 120.0, 10.0), 1031));
        assert_eq!(out.state, NavigationState::Lost);
        assert_eq!(out.command, MotorCommand::new(-30.0, 31.0));
        assert!(!out.reset_speed_controllers);
        assert_eq!(nav.lost_line_count(), 51);

        // Target reached: stop, clear the count, back to plain Lost
        let out = nav.tick(&inputs(0.9, Pose::new(3.5, 120.0, 10.0), 1062));
        assert!(out.command.is_stop());
        assert!(out.maneuver.is_none());
        assert_eq!(out.state, NavigationState::Lost);
        assert_eq!(nav.lost_line_count(), 0);
    }

    #[test]
    fn test_recovery_turn_power_frozen_at_start() {
        let mut nav = navigator_in(NavigationState::Lost);
        nav.lost_line_count = 51;

        let mut start = inputs(0.0, Pose::new(0.0, 120.0, 0.0), 1000);
        start.cruise = MotorCommand::new(26.0, 24.0);
        let out = nav.tick(&start);
        assert_eq!(out.command, MotorCommand::new(-26.0, 24.0));

        // Later cruise values do not change the turn
        let out = nav.tick(&inputs(0.0, Pose::new(1.0, 120.0, 0.0), 1031));
        assert_eq!(out.command, MotorCommand::new(-26.0, 24.0));
        assert_eq!(
            out.maneuver,
            Some(Maneuver::RecoveryTurn {
                target_heading: PI - 0.2,
                command: MotorCommand::new(-26.0, 24.0),
            })
        );
    }

    #[test]
    fn test_end_of_track_dwell_then_return() {
        let mut nav = navigator_in(NavigationState::Lost);
        nav.lost_line_count = 51;
        let pose = Pose::new(0.0, 900.0, 40.0);

        let out = nav.tick(&inputs(0.0, pose, 5000));
        assert!(out.command.is_stop());
        assert_eq!(
            out.maneuver,
            Some(Maneuver::EndOfTrackDwell { until_ms: 7000 })
        );

        let out = nav.tick(&inputs(0.5, pose, 6999));
        assert!(out.command.is_stop());
        assert_eq!(out.state, NavigationState::Lost);

        let out = nav.tick(&inputs(0.5, pose, 7000));
        assert_eq!(out.state, NavigationState::Return);
        assert!(out.maneuver.is_none());
        // Not reset on the way to Return
        assert_eq!(nav.lost_line_count(), 51);
    }

    #[test]
    fn test_negative_x_past_threshold_is_end_of_track() {
        let mut nav = navigator_in(NavigationState::Lost);
        nav.lost_line_count = 60;
        let out = nav.tick(&inputs(0.0, Pose::new(0.0, -300.0, 0.0), 100));
        assert!(matches!(
            out.maneuver,
            Some(Maneuver::EndOfTrackDwell { .. })
        ));
    }

    #[test]
    fn test_return_aligns_then_drives_home() {
        let mut nav = navigator_in(NavigationState::Return);
        let far = Pose::new(0.0, 1000.0, 0.0);

        // Home heading is pi; heading 0 is too small, rotate positive
        let out = nav.tick(&inputs(0.0, far, 100));
        assert_eq!(out.command, MotorCommand::new(-21.0, 22.0));
        assert!(out.line_indicator);
        assert!((nav.home_heading().unwrap() - PI).abs() < 1e-5);

        // Pose keeps changing but the home heading is computed only once
        let out = nav.tick(&inputs(0.0, Pose::new(3.0, 1000.0, 800.0), 131));
        assert_eq!(out.state, NavigationState::Return);
        assert!((nav.home_heading().unwrap() - PI).abs() < 1e-5);
        assert_eq!(out.maneuver, Some(Maneuver::DriveHome { until_ms: 15131 }));
        assert!(out.reset_speed_controllers);
        assert_eq!(out.command, CRUISE);

        let out = nav.tick(&inputs(0.0, Pose::new(3.0, 500.0, 0.0), 10_000));
        assert_eq!(out.command, CRUISE);
        assert!(!out.reset_speed_controllers);

        let out = nav.tick(&inputs(0.0, Pose::new(3.0, 0.0, 0.0), 15_131));
        assert_eq!(out.state, NavigationState::Home);
        assert!(out.command.is_stop());

        let out = nav.tick(&inputs(0.5, Pose::default(), 20_000));
        assert_eq!(out.state, NavigationState::Home);
        assert!(out.command.is_stop());
        assert!(!out.line_indicator);
    }

    #[test]
    fn test_return_rotates_negative_when_past_home() {
        let mut nav = navigator_in(NavigationState::Return);
        nav.home_heading = Some(0.0);
        let out = nav.tick(&inputs(0.0, Pose::new(0.5, 10.0, 0.0), 100));
        assert_eq!(out.command, MotorCommand::new(21.0, -21.0));
        // A home heading of exactly zero is kept, not recomputed
        assert_eq!(nav.home_heading(), Some(0.0));
    }

    #[test]
    fn test_tick_is_deterministic() {
        let script = [0.05, 0.3, 0.0, 0.25, 0.15, 0.02, 0.01, -0.4, -0.12];
        let run = || {
            let mut nav = Navigator::default();
            let mut outputs = [None; 9];
            for (i, e) in script.iter().enumerate() {
                let heading = i as f32 * 0.2;
                outputs[i] = Some(nav.tick(&inputs(*e, Pose::new(heading, 50.0, 0.0), i as u64 * 31)));
            }
            outputs
        };
        assert_eq!(run(), run());
    }
}
