//! line_tracer_core - Pure no_std control core for a line-following robot
//!
//! This crate contains platform-agnostic algorithms and types
//! that can be tested on host without any feature flags or hardware.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Hardware and collaborators injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Time source, pose estimator and indicator abstractions
//! - [`sensor`]: Five-channel discharge-time line sensor and line error
//! - [`speed`]: Wheel speed estimation feeding the speed controllers
//! - [`scheduler`]: Cooperative multi-rate task scheduler
//! - [`navigation`]: Line-following navigation state machine
//! - [`motor`]: Differential drive abstraction for DC motors
//! - [`parameters`]: Parameter store and line follower tuning

#![no_std]

pub mod motor;
pub mod navigation;
pub mod parameters;
pub mod scheduler;
pub mod sensor;
pub mod speed;
pub mod traits;
