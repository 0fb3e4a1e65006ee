//! Error types for the rover telemetry pipeline

use thiserror::Error;

use crate::connection::ConnectionState;

/// Error type for telemetry decoding and connection control
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    /// Binary frame with the wrong byte length
    #[error("Malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    /// Request not allowed in the current connection state
    #[error("Cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: ConnectionState,
    },

    /// Target address that cannot form a WebSocket URL
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// Transport failure reported by the WebSocket layer
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_frame_message() {
        let err = TelemetryError::MalformedFrame {
            expected: 52,
            actual: 12,
        };
        assert_eq!(err.to_string(), "Malformed frame: expected 52 bytes, got 12");
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = TelemetryError::InvalidTransition {
            operation: "connect",
            state: ConnectionState::Closing,
        };
        assert_eq!(err.to_string(), "Cannot connect while closing");
    }
}
