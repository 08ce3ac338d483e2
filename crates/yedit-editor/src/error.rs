//! # Adapter Errors
//!
//! Failures surfaced by `EditorAdapter`. Resolution misses and stale fetch
//! deliveries are outcomes, not errors, and have no variant here.

use thiserror::Error;
use yedit_core::{ConfigurationError, LanguageId, SessionError};

use crate::platform::PlatformError;

/// Error returned by adapter operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The diagnostics configuration was rejected; nothing was registered.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// `mount` was called before any configuration was registered for the
    /// adapter's language.
    #[error("no diagnostics configuration registered for language '{0}'")]
    NotInitialized(LanguageId),

    /// The operation needs a live surface.
    #[error("editor is not mounted")]
    NotMounted,

    /// Session state machine transition rejected.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The platform failed to provide a surface.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}
