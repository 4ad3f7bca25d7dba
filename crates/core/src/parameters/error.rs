//! Parameter store errors

use core::fmt;

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// Name too long or not registered
    InvalidConfig,
    /// No room for another parameter
    StoreFull,
    /// Parameter is fixed by the hardware build
    ReadOnly,
    /// Value type differs from the registered type
    TypeMismatch,
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::InvalidConfig => write!(f, "unknown or malformed parameter name"),
            ParameterError::StoreFull => write!(f, "parameter store full"),
            ParameterError::ReadOnly => write!(f, "parameter is read-only"),
            ParameterError::TypeMismatch => write!(f, "parameter value has the wrong type"),
        }
    }
}
