//! Typed errors for wifictl control-plane operations

use thiserror::Error;

/// Result type alias for control-plane operations
pub type WifiResult<T> = Result<T, WifiError>;

/// Errors that can occur while driving the WiFi control plane
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WifiError {
    #[error("invalid parameter: {what}")]
    InvalidParameter { what: String },

    #[error("{operation} is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("scan store is full ({capacity} entries)")]
    CapacityExceeded { capacity: usize },

    #[error("a scan is already in progress")]
    AlreadyScanning,

    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
}

impl WifiError {
    /// Shorthand for an `InvalidParameter` with a formatted description
    pub fn invalid_parameter(what: impl Into<String>) -> Self {
        WifiError::InvalidParameter { what: what.into() }
    }

    pub(crate) fn invalid_state(operation: &'static str, state: impl Into<String>) -> Self {
        WifiError::InvalidState {
            operation,
            state: state.into(),
        }
    }
}
