#![cfg_attr(not(test), no_std)]

//! line_tracer_firmware - Control loop and drivers for the line_tracer robot
//!
//! This crate wires the pure control core from `line_tracer_core` to
//! hardware through small platform traits and runs the cooperative
//! multi-rate control loop.
//!
//! # Design Principles
//!
//! - **Single context**: All mutable control state lives in one `LineFollower`
//! - **Platform implementations**: GPIO and PWM abstraction, mocks for host testing
//! - **Device drivers**: Reflectance channels, IR emitter, PWM drive and indicators
//! - **Logging**: `log_*!` macros routed to defmt or the `log` facade

// Platform abstraction layer
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Firmware-specific core code (logging) and re-exports from line_tracer_core
pub mod core;

// Line-following rover implementation
pub mod rover;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!)
// are exported at crate root via #[macro_export] in core::logging
