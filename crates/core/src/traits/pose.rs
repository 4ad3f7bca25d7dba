//! Dead-reckoning collaborator interface
//!
//! The pose estimate is owned by an external kinematics component that
//! integrates wheel encoder motion. The control core only advances it and
//! reads snapshots.

/// Planar pose snapshot produced by dead reckoning
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    /// Heading in radians, counter-clockwise positive
    pub heading: f32,
    /// Longitudinal position in millimeters (along the initial heading)
    pub x: f32,
    /// Lateral position in millimeters
    pub y: f32,
}

impl Pose {
    /// Create a new pose snapshot
    pub const fn new(heading: f32, x: f32, y: f32) -> Self {
        Self { heading, x, y }
    }
}

/// Pose estimation collaborator
///
/// `update()` is called once per control-loop pass (and therefore also while
/// a maneuver is in progress) so that heading-driven exit conditions see
/// fresh values.
pub trait PoseEstimator {
    /// Advance the estimate using the latest encoder deltas
    fn update(&mut self);

    /// Current pose estimate
    fn pose(&self) -> Pose;
}
