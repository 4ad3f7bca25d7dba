//! Parameter management types and utilities
//!
//! This module provides the parameter store and the typed view of the line
//! follower's tuning surface. Per-component configuration structs are
//! derived from the store at startup and whenever it is marked dirty.

pub mod error;
pub mod line_follower;
pub mod storage;

pub use error::ParameterError;
pub use line_follower::LineFollowerParams;
pub use storage::{ParamFlags, ParamMetadata, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};
