//! Navigation states and in-progress maneuvers

use core::fmt;

use crate::motor::MotorCommand;

/// Top-level navigation state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavigationState {
    /// Driving straight until the line is seen
    #[default]
    Search,
    /// Turning in place onto the line
    Join,
    /// Following the line
    OnLine,
    /// Line not seen; driving straight
    Lost,
    /// Aligning with and driving toward the start
    Return,
    /// Stopped at the start (terminal)
    Home,
}

impl NavigationState {
    /// Short name for logging
    pub const fn name(&self) -> &'static str {
        match self {
            NavigationState::Search => "SEARCH",
            NavigationState::Join => "JOIN",
            NavigationState::OnLine => "ON_LINE",
            NavigationState::Lost => "LOST",
            NavigationState::Return => "RETURN",
            NavigationState::Home => "HOME",
        }
    }

    /// True once the robot is home
    pub const fn is_terminal(&self) -> bool {
        matches!(self, NavigationState::Home)
    }
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Multi-tick motion that suspends transition evaluation until it finishes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Maneuver {
    /// Turn about half a revolution after overshooting a curve
    RecoveryTurn {
        /// Heading (radians) at which the turn ends
        target_heading: f32,
        /// Cruise output at the start of the turn, left wheel reversed
        command: MotorCommand,
    },
    /// Stand still at the end of the track
    EndOfTrackDwell {
        /// Time at which the dwell ends (ms)
        until_ms: u64,
    },
    /// Drive straight toward the start
    DriveHome {
        /// Time at which the drive ends (ms)
        until_ms: u64,
    },
}

impl Maneuver {
    /// Short name for logging
    pub const fn name(&self) -> &'static str {
        match self {
            Maneuver::RecoveryTurn { .. } => "recovery_turn",
            Maneuver::EndOfTrackDwell { .. } => "end_of_track_dwell",
            Maneuver::DriveHome { .. } => "drive_home",
        }
    }
}

/// State change made by a navigation tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State before the tick
    pub from: NavigationState,
    /// State after the tick
    pub to: NavigationState,
}
