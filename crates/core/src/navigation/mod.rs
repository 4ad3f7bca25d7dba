//! Line-following navigation
//!
//! This module contains the navigation state machine and the pure helpers it
//! is built from.
//!
//! # Components
//!
//! - [`fsm`]: `Navigator`, the per-tick state machine
//! - [`state`]: Navigation states and multi-tick maneuvers
//! - [`steering`]: Three-tier on-line steering law
//! - [`heading`]: Home heading from dead-reckoned position
//! - [`types`]: Configuration, tick inputs and outputs

pub mod fsm;
pub mod heading;
pub mod state;
pub mod steering;
mod types;

pub use fsm::Navigator;
pub use heading::home_heading;
pub use state::{Maneuver, NavigationState, Transition};
pub use steering::on_line_command;
pub use types::{NavInputs, NavOutput, NavigationConfig, SteeringConfig};
