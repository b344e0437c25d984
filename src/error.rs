//! Crate-wide error type
//!
//! Every subsystem returns `BridgeResult<T>`. Subsystem modules add their own
//! aliases and helper constructors on top of this (see `network::error`).

use thiserror::Error;

use crate::network::PacketType;

/// Result type used throughout the bridge
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced by the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Connection to {addr} failed: {error}")]
    ConnectionFailed { addr: String, error: String },

    #[error("Transport failure during {operation}: {error}")]
    Transport { operation: String, error: String },

    #[error("Render server rejected {request:?}: {message}")]
    ServerError { request: PacketType, message: String },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },

    #[error("Mesh '{name}' cannot be uploaded: {reason}")]
    InvalidMesh { name: String, reason: String },

    #[error("Configuration error in {path}: {error}")]
    Config { path: String, error: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the error came from the socket rather than the remote side
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BridgeError::Transport { .. } | BridgeError::ConnectionFailed { .. } | BridgeError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::InvalidMesh {
            name: "Cube".to_string(),
            reason: "no normals".to_string(),
        };
        assert_eq!(err.to_string(), "Mesh 'Cube' cannot be uploaded: no normals");

        let err = BridgeError::ServerError {
            request: PacketType::LoadLocalMesh,
            message: "out of memory".to_string(),
        };
        assert!(err.to_string().contains("LoadLocalMesh"));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: BridgeError = io.into();
        assert!(err.is_transport());
    }
}
