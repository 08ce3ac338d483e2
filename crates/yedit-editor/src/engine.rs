//! # Diagnostics Engine Interface
//!
//! The capability the adapter consumes for validation, hover, completion
//! and formatting. Configurations are registered per language id; every
//! session created with that language inherits the registration.
//!
//! `EngineRegistry` is the implementation backed by
//! `yedit_schema::LanguageService`. Hosts with their own engine implement
//! this trait instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use yedit_core::{ConfigurationError, DiagnosticsConfiguration, LanguageId, Position, SchemaId};
use yedit_schema::{Analysis, CompletionItem, FetchError, Hover};

/// Proof that a configuration was registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineHandle {
    /// Language the configuration is registered under.
    pub language: LanguageId,
    /// Registration generation; a later registration has a higher one.
    pub generation: u64,
}

/// Validation, completion and hover keyed by language.
pub trait DiagnosticsEngine {
    /// Register `config` for `language`, replacing any earlier registration.
    ///
    /// The configuration is validated and compiled completely before it
    /// replaces anything; on error the previous registration stays in place.
    fn register(
        &self,
        language: &LanguageId,
        config: DiagnosticsConfiguration,
    ) -> Result<EngineHandle, ConfigurationError>;

    /// Drop the registration for `language`. Returns whether one existed.
    fn unregister(&self, language: &LanguageId) -> bool;

    /// Generation of the current registration, if any.
    fn generation(&self, language: &LanguageId) -> Option<u64>;

    /// Resolve and check `content`. `None` when `language` is unregistered.
    fn analyze(&self, language: &LanguageId, path: &str, content: &str) -> Option<Analysis>;

    /// Schema documentation for the key at `position`.
    fn hover(
        &self,
        language: &LanguageId,
        path: &str,
        content: &str,
        position: Position,
    ) -> Option<Hover>;

    /// Completion proposals at `position`.
    fn complete(
        &self,
        language: &LanguageId,
        path: &str,
        content: &str,
        position: Position,
    ) -> Vec<CompletionItem>;

    /// Formatted `content`, or `None` when unchanged or disabled.
    fn format(&self, language: &LanguageId, content: &str) -> Option<String>;

    /// Hand over the outcome of fetching a body-less schema.
    fn store_fetched(
        &self,
        language: &LanguageId,
        schema: &SchemaId,
        result: Result<Value, FetchError>,
    );
}
