//! Error types for trafficshell-core.

use crate::config::ConfigError;
use thiserror::Error;

/// Result type alias for trafficshell-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in reservation helpers and controller drivers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Error from the automation API
    #[error("API error: {0}")]
    Api(#[from] trafficshell_api::ApiError),

    /// The context shape does not carry the requested data
    #[error("could not resolve {what} from {shape} context")]
    Resolution {
        /// What was being resolved (session, reservation ID)
        what: &'static str,
        /// Context shape that was inspected
        shape: &'static str,
    },

    /// Polling exhausted its attempts
    #[error("{kind} {names:?} not in reservation after {timeout} seconds")]
    Timeout {
        /// Entity kind (Resources, Services, Connectors)
        kind: &'static str,
        /// Requested names that were not all found
        names: Vec<String>,
        /// Timeout the poll ran with
        timeout: u32,
    },

    /// None of the namespaced attribute candidates exist on the resource
    #[error("attribute {attribute} not found on resource {resource}")]
    AttributeNotFound {
        /// Resource that was inspected
        resource: String,
        /// Unqualified attribute name
        attribute: String,
    },

    /// An entity that was assumed to exist is missing
    #[error("{kind} not found: {name}")]
    MissingEntity {
        /// Entity kind
        kind: &'static str,
        /// Name or alias that was looked up
        name: String,
    },

    /// Invalid controller state for operation
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Failure reported by a traffic-generator handler
    #[error("handler error: {0}")]
    Handler(String),
}

impl CoreError {
    /// Check if this error is a polling timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error is a context resolution failure.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_names_unmatched_set() {
        let err = CoreError::Timeout {
            kind: "Resources",
            names: vec!["a".into(), "b".into()],
            timeout: 4,
        };
        assert_eq!(
            err.to_string(),
            r#"Resources ["a", "b"] not in reservation after 4 seconds"#
        );
        assert!(err.is_timeout());
        assert!(!err.is_resolution());
    }

    #[test]
    fn test_resolution_display() {
        let err = CoreError::Resolution {
            what: "session",
            shape: "reservation",
        };
        assert_eq!(err.to_string(), "could not resolve session from reservation context");
        assert!(err.is_resolution());
    }
}
