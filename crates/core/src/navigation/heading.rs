//! Home heading from dead-reckoned position

use core::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::traits::Pose;

/// Heading that points from `pose` back toward the origin
///
/// Computed as `pi + atan(y / x)` and folded once into (-pi, pi]. The
/// quadrant of `x` is not considered; the track always leaves the start in
/// the positive x direction. With `x == 0` the arctangent term is `±pi/2`
/// by the sign of `y`, or 0 at the origin.
pub fn home_heading(pose: &Pose) -> f32 {
    let slope_angle = if pose.x == 0.0 {
        if pose.y > 0.0 {
            FRAC_PI_2
        } else if pose.y < 0.0 {
            -FRAC_PI_2
        } else {
            0.0
        }
    } else {
        libm::atanf(pose.y / pose.x)
    };

    wrap_once(PI + slope_angle)
}

/// Fold an angle into (-pi, pi] by adding or subtracting at most one turn
pub fn wrap_once(angle: f32) -> f32 {
    if angle > PI {
        angle - TAU
    } else if angle <= -PI {
        angle + TAU
    } else {
        angle
    }
}
