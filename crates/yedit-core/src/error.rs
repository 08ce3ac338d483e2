//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the editor workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Configuration errors are raised before any editing session exists and
//!   name the offending association so the host can fix its input.
//! - Resolution misses and stale asynchronous results are not errors and
//!   have no variant here.
//! - Session errors include the current state and the attempted target.

use thiserror::Error;

/// Top-level error type for the editor workspace.
#[derive(Error, Debug)]
pub enum YeditError {
    /// The diagnostics configuration was rejected.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Session state machine transition rejected.
    #[error("invalid session transition: {0}")]
    InvalidTransition(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A diagnostics configuration that cannot be registered.
///
/// Raised synchronously by `initialize`. Registration is all-or-nothing:
/// when this error is returned the engine state is exactly what it was
/// before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two associations in the same snapshot share an identity.
    #[error("duplicate schema identity '{identity}' at positions {first} and {second}")]
    DuplicateSchemaId {
        /// The repeated identity.
        identity: String,
        /// Index of the first association carrying it.
        first: usize,
        /// Index of the repeated association.
        second: usize,
    },

    /// A schema identity is empty or whitespace.
    #[error("schema identity must not be empty")]
    EmptySchemaId,

    /// A path pattern is not a valid glob.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// The requested YAML dialect revision is not supported.
    #[error("unsupported yaml version '{0}' (expected 1.1 or 1.2)")]
    UnsupportedDialect(String),

    /// An inline schema body failed to compile.
    #[error("schema '{identity}' is not a valid schema: {reason}")]
    InvalidSchemaBody {
        /// Identity of the association carrying the body.
        identity: String,
        /// Compiler message.
        reason: String,
    },
}

/// Error in session state machine transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Attempted an invalid state transition.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current state name.
        from: String,
        /// Attempted target state name.
        to: String,
    },
}

impl From<SessionError> for YeditError {
    fn from(err: SessionError) -> Self {
        YeditError::InvalidTransition(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display_names_identity_and_positions() {
        let err = ConfigurationError::DuplicateSchemaId {
            identity: "s1".to_string(),
            first: 0,
            second: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("'s1'"));
        assert!(msg.contains("0 and 2"));
    }

    #[test]
    fn test_configuration_error_lifts_into_top_level() {
        let err: YeditError = ConfigurationError::EmptySchemaId.into();
        assert!(matches!(err, YeditError::Configuration(_)));
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_session_error_lifts_into_top_level() {
        let err: YeditError = SessionError::InvalidTransition {
            from: "UNMOUNTED".to_string(),
            to: "CONFIG_CHANGING".to_string(),
        }
        .into();
        assert!(err.to_string().contains("UNMOUNTED"));
    }
}
