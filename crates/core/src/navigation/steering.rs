//! On-line steering law

use super::types::SteeringConfig;
use crate::motor::MotorCommand;

/// Map a line error to wheel power while following the line
///
/// Positive error means the line is to the left, so the right wheel drives
/// harder. The tiers are exclusive: sharp pivot, proportional arc, then a
/// fixed straight command. The straight tier does not use the speed
/// controller output.
pub fn on_line_command(e_line: f32, config: &SteeringConfig) -> MotorCommand {
    let magnitude = libm::fabsf(e_line);

    if magnitude > config.sharp_threshold {
        if e_line > 0.0 {
            MotorCommand::new(0.0, e_line * config.sharp_gain)
        } else {
            MotorCommand::new(-e_line * config.sharp_gain, 0.0)
        }
    } else if magnitude > config.arc_threshold {
        if e_line > 0.0 {
            MotorCommand::new(config.arc_base_left, e_line * config.arc_gain)
        } else {
            MotorCommand::new(-e_line * config.arc_gain, config.arc_base_right)
        }
    } else {
        MotorCommand::straight(config.straight_power)
    }
}
