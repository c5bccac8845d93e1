//! Error types for Lensboard.

use crate::camera::CameraId;
use thiserror::Error;

/// A shared error type for the whole Lensboard workspace.
///
/// Variants are typed and structured; common library errors convert
/// automatically through `From`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LensError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The backend answered with a non-success status code
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connect, timeout, body read)
    #[error("Transport error: {message}")]
    Transport { message: String, retryable: bool },

    /// The backend answered 200 but the payload was unusable
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session manager has been torn down
    #[error("Session manager has been shut down")]
    ShutDown,

    /// A start request finished after the camera was stopped or re-scanned
    #[error("Start of camera {camera_id} was superseded by a later stop")]
    Superseded { camera_id: CameraId },

    /// Some cameras in a batch operation failed while others succeeded
    #[error("{} camera(s) failed: {}", .failed.len(), format_failures(.failed))]
    PartialFailure { failed: Vec<(CameraId, LensError)> },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_failures(failed: &[(CameraId, LensError)]) -> String {
    failed
        .iter()
        .map(|(id, err)| format!("camera {id}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl LensError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a NotFound error for a camera id
    pub fn camera_not_found(id: CameraId) -> Self {
        Self::not_found("camera", id.to_string())
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self::Transport {
            message: message.into(),
            retryable,
        }
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

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Returns the HTTP status code if the backend answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether trying the same request again later could succeed.
    ///
    /// Connect failures, timeouts and 5xx answers are retryable; 4xx answers
    /// and local errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { retryable, .. } => *retryable,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LensError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LensError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LensError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LensError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LensError>`.
pub type Result<T> = std::result::Result<T, LensError>;
