//! Network-specific error handling
//!
//! Type aliases and helper constructors for transport and protocol failures.

use crate::error::{BridgeError, BridgeResult};
use crate::network::PacketType;

/// Type alias for network-specific results
pub type NetworkResult<T> = BridgeResult<T>;

/// Helper trait attaching the failing operation to socket errors
pub trait NetworkErrorContext<T> {
    fn network_context(self, operation: &str) -> NetworkResult<T>;
}

impl<T> NetworkErrorContext<T> for std::io::Result<T> {
    fn network_context(self, operation: &str) -> NetworkResult<T> {
        self.map_err(|e| transport_error(operation, e))
    }
}

/// Create a connection error
pub fn connection_error(addr: &str, error: impl std::fmt::Display) -> BridgeError {
    BridgeError::ConnectionFailed {
        addr: addr.to_string(),
        error: error.to_string(),
    }
}

/// Create a transport error
pub fn transport_error(operation: &str, error: impl std::fmt::Display) -> BridgeError {
    BridgeError::Transport {
        operation: operation.to_string(),
        error: error.to_string(),
    }
}

/// Create a protocol error
pub fn protocol_error(message: impl Into<String>) -> BridgeError {
    BridgeError::ProtocolError {
        message: message.into(),
    }
}

/// Create an error for a reply the server sent instead of the expected one
pub fn server_error(request: PacketType, message: impl Into<String>) -> BridgeError {
    BridgeError::ServerError {
        request,
        message: message.into(),
    }
}
