//! # yedit-cli — Command-Line Harness
//!
//! Runs the schema-aware YAML checks outside an editor. A props file (the
//! same camelCase YAML a host passes to the editor) supplies the schema
//! associations and feature toggles.
//!
//! ## Subcommands
//!
//! - `yedit check FILE...`: print diagnostics as
//!   `path:line:col: severity: message [source]`; exit 1 on any error.
//! - `yedit resolve PATH...`: print the schema governing each path.
//! - `yedit format [--write] FILE...`: normalize whitespace.
//!
//! ```bash
//! yedit --config editor.yaml check pipelines/*.pipeline.yaml
//! yedit --config editor.yaml resolve deploy/web.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed arguments
//!   and a writer so they can be exercised directly.
//! - Handlers delegate to `yedit-schema`; no validation logic here.

pub mod check;
pub mod format;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use yedit_core::EditorProps;
use yedit_schema::LanguageService;

/// Props and the directory relative schema identities are read from.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Parsed props; defaults when no config file was given.
    pub props: EditorProps,
    /// Directory of the config file, or the current directory.
    pub base_dir: PathBuf,
}

impl Workspace {
    /// Load props from `config`, or use defaults without schemas.
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let Some(path) = config else {
            return Ok(Self {
                props: EditorProps::default(),
                base_dir: PathBuf::from("."),
            });
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let props = EditorProps::from_yaml_str(&text)
            .with_context(|| format!("invalid config: {}", path.display()))?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tracing::debug!(
            config = %path.display(),
            schemas = props.schemas.len(),
            "loaded editor props"
        );
        Ok(Self { props, base_dir })
    }

    /// Compile the diagnostics configuration the props describe.
    pub fn service(&self) -> Result<LanguageService> {
        LanguageService::new(self.props.diagnostics_configuration())
            .context("diagnostics configuration rejected")
    }
}

/// Document identity for a file given on the command line.
pub fn document_path(file: &Path) -> String {
    file.to_string_lossy().replace('\\', "/")
}
