//! Core line follower functionality
//!
//! This module provides firmware-specific core code and re-exports
//! pure control logic from line_tracer_core.

// Firmware-specific modules
pub mod logging;

// Re-export pure types from line_tracer_core for compatibility
// This allows code to use crate::core::X where X is from the core library
pub use line_tracer_core::motor;
pub use line_tracer_core::navigation;
pub use line_tracer_core::parameters;
pub use line_tracer_core::scheduler;
pub use line_tracer_core::sensor;
pub use line_tracer_core::speed;
pub use line_tracer_core::traits;
