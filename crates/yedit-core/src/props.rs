//! # Editor Props
//!
//! The declarative surface the hosting application configures the editor
//! with. Props split into the diagnostics configuration registered with
//! the engine and the initial state of the editable surface.
//!
//! Props deserialize from camelCase YAML or JSON, so a host can keep them
//! in a file next to the documents they govern.

use serde::{Deserialize, Serialize};

use crate::config::{DiagnosticsConfiguration, SchemaAssociation};
use crate::dialect::DialectVersion;
use crate::error::YeditError;
use crate::identity::LanguageId;

/// Sizing hint passed through to the surface unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Height {
    /// Height in pixels.
    Pixels(u32),
    /// Any CSS length, e.g. `"60vh"`.
    Css(String),
}

impl Default for Height {
    fn default() -> Self {
        Self::Css("100%".to_string())
    }
}

impl std::fmt::Display for Height {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{px}px"),
            Self::Css(css) => f.write_str(css),
        }
    }
}

/// Initial state for mounting one editable surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorSessionInit {
    /// Initial buffer content.
    pub content: String,
    /// Whether user edits are refused.
    pub read_only: bool,
    /// Sizing hint.
    pub height: Height,
    /// Document identity used for association matching.
    pub path: Option<String>,
}

impl EditorSessionInit {
    /// Session init with the given content and defaults elsewhere.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the document path.
    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the initial read-only state.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Host-facing props of the YAML editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorProps {
    /// Initial buffer content.
    pub value: String,
    /// Sizing hint.
    pub height: Height,
    /// Toggles interactivity.
    pub read_only: bool,
    /// Associations in resolution order.
    pub schemas: Vec<SchemaAssociation>,
    /// Maps to `allow_remote_schema_fetch`.
    pub enable_schema_request: bool,
    /// Maps to `dialect_version`.
    pub yaml_version: DialectVersion,
    /// Completion toggle.
    pub completion: bool,
    /// Hover toggle.
    pub hover: bool,
    /// Formatting toggle.
    pub format: bool,
    /// Validation toggle.
    pub validate: bool,
    /// Maps to `kubernetes_mode`.
    pub is_kubernetes: bool,
    /// Syntax mode identifier.
    pub language: LanguageId,
    /// Document identity for association matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Default for EditorProps {
    fn default() -> Self {
        Self {
            value: String::new(),
            height: Height::default(),
            read_only: false,
            schemas: Vec::new(),
            enable_schema_request: false,
            yaml_version: DialectVersion::default(),
            completion: true,
            hover: true,
            format: true,
            validate: true,
            is_kubernetes: false,
            language: LanguageId::default(),
            path: None,
        }
    }
}

impl EditorProps {
    /// Parse props from YAML (JSON is accepted too).
    ///
    /// # Errors
    ///
    /// Returns `YeditError::Serialization` when the text is not valid props,
    /// including invalid patterns, blank identities and unsupported
    /// `yamlVersion` values.
    pub fn from_yaml_str(text: &str) -> Result<Self, YeditError> {
        serde_yaml::from_str(text).map_err(|e| YeditError::Serialization(e.to_string()))
    }

    /// The diagnostics configuration these props describe.
    pub fn diagnostics_configuration(&self) -> DiagnosticsConfiguration {
        DiagnosticsConfiguration {
            allow_remote_schema_fetch: self.enable_schema_request,
            dialect_version: self.yaml_version,
            enable_completion: self.completion,
            enable_hover: self.hover,
            enable_formatting: self.format,
            enable_validation: self.validate,
            kubernetes_mode: self.is_kubernetes,
            schema_associations: self.schemas.clone(),
        }
    }

    /// The initial surface state these props describe.
    pub fn session_init(&self) -> EditorSessionInit {
        EditorSessionInit {
            content: self.value.clone(),
            read_only: self.read_only,
            height: self.height.clone(),
            path: self.path.clone(),
        }
    }
}
