//! # Schema Fetching
//!
//! Associations without an inline body are loaded by identity when remote
//! fetch is allowed. The engine never performs I/O itself; the host runs a
//! [`SchemaFetcher`] and hands the result back through
//! `LanguageService::store_fetched`.
//!
//! Two fetchers ship with the crate. [`InMemoryFetcher`] serves bodies
//! registered up front and is what tests use. [`FileFetcher`] reads the
//! identity as a path (plain or `file://`) below a base directory. Neither
//! talks to the network: `http(s)` identities are reported as not found.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use yedit_core::SchemaId;

use crate::convert::yaml_to_json_value_1_2;

/// Why a schema body could not be obtained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Nothing is known under this identity.
    #[error("schema {0} not found")]
    NotFound(String),

    /// The body exists but could not be read.
    #[error("failed to read schema {identity}: {reason}")]
    Io {
        /// Schema identity.
        identity: String,
        /// Underlying error.
        reason: String,
    },

    /// The body was read but is not JSON or YAML.
    #[error("schema {identity} is not valid JSON or YAML: {reason}")]
    Parse {
        /// Schema identity.
        identity: String,
        /// Parser message.
        reason: String,
    },
}

/// Loads schema bodies by identity.
pub trait SchemaFetcher {
    /// Fetch the body registered under `id`.
    fn fetch(&self, id: &SchemaId) -> Result<Value, FetchError>;
}

/// Serves bodies registered ahead of time.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    bodies: HashMap<SchemaId, Value>,
}

impl InMemoryFetcher {
    /// An empty fetcher; every identity is `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body, builder style.
    pub fn with(mut self, id: SchemaId, body: Value) -> Self {
        self.bodies.insert(id, body);
        self
    }

    /// Register a body.
    pub fn insert(&mut self, id: SchemaId, body: Value) {
        self.bodies.insert(id, body);
    }
}

impl SchemaFetcher for InMemoryFetcher {
    fn fetch(&self, id: &SchemaId) -> Result<Value, FetchError> {
        self.bodies
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

/// Reads schema files below a base directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    base_dir: PathBuf,
}

impl FileFetcher {
    /// Resolve relative identities against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The directory relative identities resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Map an identity to a file path, if it names one.
    pub fn path_for(&self, id: &SchemaId) -> Option<PathBuf> {
        let raw = id.as_str();
        if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("builtin:") {
            return None;
        }
        let raw = raw.strip_prefix("file://").unwrap_or(raw);
        let path = Path::new(raw);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        })
    }
}

impl SchemaFetcher for FileFetcher {
    fn fetch(&self, id: &SchemaId) -> Result<Value, FetchError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| FetchError::NotFound(id.to_string()))?;
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(id.to_string()),
            _ => FetchError::Io {
                identity: id.to_string(),
                reason: e.to_string(),
            },
        })?;
        parse_schema_text(id, &text, &path)
    }
}

fn parse_schema_text(id: &SchemaId, text: &str, path: &Path) -> Result<Value, FetchError> {
    let parse_err = |reason: String| FetchError::Parse {
        identity: id.to_string(),
        reason,
    };
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
        yaml_to_json_value_1_2(&yaml).map_err(parse_err)
    } else {
        serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))
    }
}
