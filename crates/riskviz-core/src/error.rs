//! Error types for the Riskviz client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Riskviz client crates.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The `Backend`/`Transport`
/// split matters to callers: a backend rejection may carry a human-readable
/// `detail` string from the error envelope, a transport failure never does.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RiskvizError {
    /// The backend answered with a non-2xx status. `detail` holds the
    /// human-readable message from the error envelope when one was present.
    #[error("Backend error ({}): {}", .status, .detail.as_deref().unwrap_or("no detail"))]
    Backend { status: u16, detail: Option<String> },

    /// The request never produced a response (connection failure, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RiskvizError {
    /// Creates a Backend error
    pub fn backend(status: u16, detail: Option<String>) -> Self {
        Self::Backend { status, detail }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Backend error
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the backend-provided error detail, if any.
    ///
    /// Only `Backend` errors can carry a detail string; every other variant
    /// yields `None` and callers fall back to a generic message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Backend { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RiskvizError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RiskvizError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for RiskvizError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<String> for RiskvizError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, RiskvizError>`.
pub type Result<T> = std::result::Result<T, RiskvizError>;
