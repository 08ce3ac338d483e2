//! # Schema Compilation and Validation
//!
//! Compiles association bodies into `jsonschema` validators and turns
//! validation failures into structured violations.
//!
//! ## Reference Resolution
//!
//! A `$ref` naming another association's identity resolves to that
//! association's body. The retriever never touches the network: unknown
//! URIs resolve to the permissive schema `{}`, so a dangling reference
//! constrains nothing instead of failing compilation.
//!
//! The draft is taken from each body's `$schema`, defaulting to the
//! newest draft the validator supports.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use yedit_core::{ConfigurationError, SchemaId};

/// Base URI `jsonschema` assigns to schemas without an `$id`.
const DEFAULT_BASE_URI: &str = "json-schema:///";

/// Resolves `$ref` URIs to association bodies held in memory.
struct AssociationRetriever {
    /// Map from identity (or `$id`) to schema body.
    schemas_by_id: HashMap<String, Value>,
}

impl Retrieve for AssociationRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_id.get(uri_str) {
            return Ok(value.clone());
        }

        // Bare identities are resolved relative to the default base URI.
        if let Some(value) = uri_str
            .strip_prefix(DEFAULT_BASE_URI)
            .and_then(|bare| self.schemas_by_id.get(bare))
        {
            return Ok(value.clone());
        }

        Ok(serde_json::json!({}))
    }
}

/// A body compiled into a validator.
#[derive(Clone)]
pub struct CompiledSchema {
    /// The identity it was compiled under.
    pub identity: SchemaId,
    /// The schema body.
    pub body: Arc<Value>,
    /// The compiled validator.
    pub validator: Arc<Validator>,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Compiles bodies with every other known body available for `$ref`.
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    schemas_by_id: HashMap<String, Value>,
}

impl SchemaCompiler {
    /// A compiler with no cross-references registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `body` reachable by `$ref` under `identity` and its own `$id`.
    pub fn register(&mut self, identity: &SchemaId, body: &Value) {
        self.schemas_by_id
            .insert(identity.as_str().to_string(), body.clone());
        if let Some(id) = body.get("$id").and_then(Value::as_str) {
            self.schemas_by_id.insert(id.to_string(), body.clone());
        }
    }

    fn options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_retriever(AssociationRetriever {
            schemas_by_id: self.schemas_by_id.clone(),
        });
        opts
    }

    /// Compile `body` into a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidSchemaBody` when the body is not
    /// a usable schema.
    pub fn compile(
        &self,
        identity: &SchemaId,
        body: &Value,
    ) -> Result<CompiledSchema, ConfigurationError> {
        if !(body.is_object() || body.is_boolean()) {
            return Err(ConfigurationError::InvalidSchemaBody {
                identity: identity.to_string(),
                reason: "a schema must be an object or a boolean".to_string(),
            });
        }
        let validator =
            self.options()
                .build(body)
                .map_err(|e| ConfigurationError::InvalidSchemaBody {
                    identity: identity.to_string(),
                    reason: e.to_string(),
                })?;
        Ok(CompiledSchema {
            identity: identity.clone(),
            body: Arc::new(body.clone()),
            validator: Arc::new(validator),
        })
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Validate `instance`, collecting every violation.
pub fn violations(validator: &Validator, instance: &Value) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}
