//! Core traits for platform-agnostic line-follower functionality.
//!
//! This module provides trait abstractions that decouple the control core
//! from the hardware and from the external collaborators it consumes.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Platform implementations live in the firmware crate

pub mod indicator;
pub mod pose;
pub mod time;

pub use indicator::Indicators;
pub use pose::{Pose, PoseEstimator};
pub use time::{MockTime, TimeSource};
