//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers the editor passes around. A
//! `SchemaId` cannot be handed where a `LanguageId` is expected, and a
//! session's identity cannot be confused with a registration generation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigurationError;

/// Opaque stable identifier of a schema association.
///
/// Used for lookup and cache keying. It may look like a URL but need not
/// be reachable. Validated non-empty at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaId(String);

impl SchemaId {
    /// Create a schema identity, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigurationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConfigurationError::EmptySchemaId);
        }
        Ok(Self(id))
    }

    /// Identity of a schema shipped with the engine, `builtin:<name>`.
    pub fn builtin(name: &str) -> Self {
        Self(format!("builtin:{name}"))
    }

    /// Borrow the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SchemaId {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SchemaId> for String {
    fn from(id: SchemaId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Syntax mode identifier a diagnostics registration is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(String);

impl LanguageId {
    /// The structured-format mode this adapter is specialized for.
    pub const YAML: &'static str = "yaml";

    /// Create a language identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The default `yaml` mode.
    pub fn yaml() -> Self {
        Self(Self::YAML.to_string())
    }

    /// Borrow the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageId {
    fn default() -> Self {
        Self::yaml()
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for one mounted editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}
