//! Error types for trafficshell-api.

use thiserror::Error;

/// Result type alias for automation API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors reported by an automation API session or attachment client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The platform rejected the call.
    #[error("API error {code}: {message}")]
    Remote {
        /// Error code returned by the platform
        code: i32,
        /// Error message returned by the platform
        message: String,
    },

    /// Could not reach the platform.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Authentication against the platform failed.
    #[error("login failed: {0}")]
    Login(String),

    /// A named object does not exist on the platform.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind of object (reservation, resource, file...)
        kind: &'static str,
        /// Name or identifier that was looked up
        name: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Shorthand for a [`ApiError::NotFound`] error.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Check if this error indicates a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
