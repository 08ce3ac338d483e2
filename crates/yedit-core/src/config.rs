//! # Diagnostics Configuration
//!
//! The immutable snapshot handed to the diagnostics engine for one
//! language registration. A new configuration is a full replacement,
//! never a patch.
//!
//! ## Invariant
//!
//! Schema identities are unique within a snapshot. A duplicate is a
//! configuration error; the later association never silently overrides
//! the earlier one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dialect::DialectVersion;
use crate::error::ConfigurationError;
use crate::identity::SchemaId;
use crate::pattern::PathPattern;

/// One structural schema bound to a subset of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAssociation {
    /// Stable identity used for lookup, caching and remote fetch.
    #[serde(alias = "uri")]
    pub identity: SchemaId,
    /// Ordered patterns; empty means catch-all.
    #[serde(default, alias = "fileMatch")]
    pub path_patterns: Vec<PathPattern>,
    /// Inline schema definition. Absent when the schema is fetched by identity.
    #[serde(default, alias = "schema", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl SchemaAssociation {
    /// An association with an inline body.
    pub fn inline(identity: SchemaId, path_patterns: Vec<PathPattern>, body: Value) -> Self {
        Self {
            identity,
            path_patterns,
            body: Some(body),
        }
    }

    /// An association resolved remotely by its identity.
    pub fn remote(identity: SchemaId, path_patterns: Vec<PathPattern>) -> Self {
        Self {
            identity,
            path_patterns,
            body: None,
        }
    }

    /// Whether this association applies to every otherwise unmatched document.
    pub fn is_catch_all(&self) -> bool {
        self.path_patterns.is_empty()
    }

    /// Whether any of this association's patterns matches `path`.
    ///
    /// Always false for a catch-all; catch-alls are consulted separately.
    pub fn matches_path(&self, path: &str) -> bool {
        self.path_patterns.iter().any(|p| p.matches(path))
    }
}

/// Toggles controlling the validation/completion engine for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfiguration {
    /// Whether associations without a body may be fetched by identity.
    pub allow_remote_schema_fetch: bool,
    /// Dialect revision for tag resolution.
    pub dialect_version: DialectVersion,
    /// Completion toggle.
    pub enable_completion: bool,
    /// Hover toggle.
    pub enable_hover: bool,
    /// Formatting toggle.
    pub enable_formatting: bool,
    /// Validation toggle.
    pub enable_validation: bool,
    /// Layer the built-in Kubernetes schemas beneath explicit associations.
    pub kubernetes_mode: bool,
    /// Associations in resolution order.
    pub schema_associations: Vec<SchemaAssociation>,
}

impl Default for DiagnosticsConfiguration {
    fn default() -> Self {
        Self {
            allow_remote_schema_fetch: false,
            dialect_version: DialectVersion::default(),
            enable_completion: true,
            enable_hover: true,
            enable_formatting: true,
            enable_validation: true,
            kubernetes_mode: false,
            schema_associations: Vec::new(),
        }
    }
}

impl DiagnosticsConfiguration {
    /// Check the snapshot invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateSchemaId` naming both positions
    /// when two associations share an identity.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, assoc) in self.schema_associations.iter().enumerate() {
            if let Some(first) = seen.insert(assoc.identity.as_str(), idx) {
                return Err(ConfigurationError::DuplicateSchemaId {
                    identity: assoc.identity.to_string(),
                    first,
                    second: idx,
                });
            }
        }
        Ok(())
    }

    /// Look up an association by identity.
    pub fn association(&self, id: &SchemaId) -> Option<&SchemaAssociation> {
        self.schema_associations.iter().find(|a| &a.identity == id)
    }
}
