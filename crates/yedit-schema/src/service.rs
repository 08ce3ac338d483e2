//! # Language Service
//!
//! The reference diagnostics engine. One `LanguageService` holds one
//! compiled `DiagnosticsConfiguration` and answers every question an
//! editor session asks about a document: which schema governs it, what is
//! wrong with it, what a key means and what may be typed next.
//!
//! ## Lifecycle
//!
//! Construction validates the configuration and compiles every inline
//! body, so a service that exists is usable. Bodies fetched by identity
//! arrive later through [`LanguageService::store_fetched`]; until then the
//! documents they govern resolve as awaiting a fetch.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::Validator;
use parking_lot::RwLock;
use serde_json::Value;
use yedit_core::{
    ConfigurationError, Diagnostic, DiagnosticSource, DiagnosticsConfiguration, Position,
    SchemaId, Severity, TextRange,
};

use crate::assist::{complete_at, hover_at, CompletionItem, Hover};
use crate::convert::yaml_to_json_value;
use crate::fetch::FetchError;
use crate::format::format_yaml;
use crate::kubernetes::{document_kind, kubernetes_schema_id, KubernetesCatalog};
use crate::locate::{split_documents, DocumentChunk, Outline};
use crate::navigate::SchemaGraph;
use crate::resolve::{resolve, FetchState, Resolution, ResolutionLayer};
use crate::validate::{violations, CompiledSchema, SchemaCompiler};

/// Everything known about one document after a diagnostics pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Which schema governs the document.
    pub resolution: Resolution,
    /// Findings, ordered by position.
    pub diagnostics: Vec<Diagnostic>,
    /// A schema the host should fetch before the next pass.
    pub pending_fetch: Option<SchemaId>,
}

#[derive(Debug, Clone)]
enum FetchedSchema {
    Loaded(CompiledSchema),
    Failed(String),
}

struct KubernetesLayer {
    catalog: KubernetesCatalog,
    validators: HashMap<&'static str, Arc<Validator>>,
}

impl std::fmt::Debug for KubernetesLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubernetesLayer")
            .field("kinds", &self.validators.len())
            .finish()
    }
}

impl KubernetesLayer {
    fn compile() -> Result<Self, ConfigurationError> {
        let catalog = KubernetesCatalog::new();
        let compiler = SchemaCompiler::new();
        let mut validators = HashMap::new();
        for (kind, body) in catalog.all() {
            let id = SchemaId::builtin(&format!("kubernetes/{kind}"));
            validators.insert(kind, compiler.compile(&id, body)?.validator);
        }
        Ok(Self {
            catalog,
            validators,
        })
    }

    fn for_kind(&self, kind: Option<&str>) -> Option<(Arc<Value>, Arc<Validator>)> {
        let (label, body) = self.catalog.schema_for(kind);
        let validator = self.validators.get(label)?;
        Some((Arc::clone(body), Arc::clone(validator)))
    }
}

/// A compiled configuration answering diagnostics, hover, completion and
/// formatting requests.
#[derive(Debug)]
pub struct LanguageService {
    config: DiagnosticsConfiguration,
    compiler: SchemaCompiler,
    compiled: HashMap<SchemaId, CompiledSchema>,
    fetched: RwLock<HashMap<SchemaId, FetchedSchema>>,
    kubernetes: Option<KubernetesLayer>,
}

impl LanguageService {
    /// Validate `config` and compile every inline body.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` found: duplicate identities,
    /// then bodies that do not compile.
    pub fn new(config: DiagnosticsConfiguration) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let mut compiler = SchemaCompiler::new();
        for assoc in &config.schema_associations {
            if let Some(body) = &assoc.body {
                compiler.register(&assoc.identity, body);
            }
        }

        let mut compiled = HashMap::new();
        for assoc in &config.schema_associations {
            if let Some(body) = &assoc.body {
                compiled.insert(assoc.identity.clone(), compiler.compile(&assoc.identity, body)?);
            }
        }

        let kubernetes = if config.kubernetes_mode {
            Some(KubernetesLayer::compile()?)
        } else {
            None
        };

        tracing::debug!(
            associations = config.schema_associations.len(),
            compiled = compiled.len(),
            kubernetes = config.kubernetes_mode,
            "language service compiled"
        );

        Ok(Self {
            config,
            compiler,
            compiled,
            fetched: RwLock::new(HashMap::new()),
            kubernetes,
        })
    }

    /// The configuration this service was built from.
    pub fn config(&self) -> &DiagnosticsConfiguration {
        &self.config
    }

    // ─── Resolution ──────────────────────────────────────────────────

    /// Which schema governs the document at `path`.
    pub fn resolve(&self, path: &str) -> Resolution {
        resolve(&self.config, path, |id| self.fetch_state(id))
    }

    fn fetch_state(&self, id: &SchemaId) -> Option<FetchState> {
        self.fetched.read().get(id).map(|f| match f {
            FetchedSchema::Loaded(_) => FetchState::Loaded,
            FetchedSchema::Failed(reason) => FetchState::Failed(reason.clone()),
        })
    }

    /// Body and validator for a governing association.
    fn compiled_for(&self, id: &SchemaId) -> Option<CompiledSchema> {
        if let Some(c) = self.compiled.get(id) {
            return Some(c.clone());
        }
        match self.fetched.read().get(id) {
            Some(FetchedSchema::Loaded(c)) => Some(c.clone()),
            _ => None,
        }
    }

    /// The schema body and validator governing one document of a stream.
    fn schema_for_document(
        &self,
        resolution: &Resolution,
        kind: Option<&str>,
    ) -> Option<(SchemaId, Arc<Value>, Arc<Validator>)> {
        match resolution {
            Resolution::Governed {
                layer: ResolutionLayer::Kubernetes,
                ..
            } => {
                let (body, validator) = self.kubernetes.as_ref()?.for_kind(kind)?;
                Some((kubernetes_schema_id(), body, validator))
            }
            Resolution::Governed { schema, .. } => {
                let c = self.compiled_for(schema)?;
                Some((c.identity, c.body, c.validator))
            }
            _ => None,
        }
    }

    /// Every body known to this service, for `$ref` navigation.
    fn graph(&self) -> SchemaGraph {
        let mut graph = SchemaGraph::new();
        let mut add = |c: &CompiledSchema| {
            graph.insert(c.identity.as_str(), Arc::clone(&c.body));
            if let Some(id) = c.body.get("$id").and_then(Value::as_str) {
                graph.insert(id, Arc::clone(&c.body));
            }
        };
        self.compiled.values().for_each(&mut add);
        for f in self.fetched.read().values() {
            if let FetchedSchema::Loaded(c) = f {
                add(c);
            }
        }
        graph
    }

    // ─── Diagnostics ─────────────────────────────────────────────────

    /// Run syntax and structural checks over `content`.
    ///
    /// Each `---` separated document is parsed and validated on its own.
    /// With validation disabled the result carries no diagnostics.
    pub fn analyze(&self, path: &str, content: &str) -> Analysis {
        let resolution = self.resolve(path);
        let pending_fetch = match &resolution {
            Resolution::AwaitingFetch { schema, .. } => Some(schema.clone()),
            _ => None,
        };
        if !self.config.enable_validation {
            return Analysis {
                resolution,
                diagnostics: Vec::new(),
                pending_fetch,
            };
        }

        let chunks = split_documents(content);
        let mut diagnostics = Vec::new();

        if let Resolution::Unavailable { schema, reason, .. } = &resolution {
            diagnostics.push(Diagnostic {
                range: chunks
                    .first()
                    .map_or_else(|| TextRange::on_line(0, 0, 1), document_start),
                severity: Severity::Warning,
                message: format!("schema {schema} could not be loaded: {reason}"),
                source: DiagnosticSource::SchemaFetch,
                schema: Some(schema.clone()),
            });
        }

        for chunk in &chunks {
            self.check_document(chunk, &resolution, &mut diagnostics);
        }

        diagnostics.sort_by_key(|d| d.range.start);
        Analysis {
            resolution,
            diagnostics,
            pending_fetch,
        }
    }

    fn check_document(
        &self,
        chunk: &DocumentChunk,
        resolution: &Resolution,
        out: &mut Vec<Diagnostic>,
    ) {
        let yaml: serde_yaml::Value = match serde_yaml::from_str(&chunk.text) {
            Ok(v) => v,
            Err(e) => {
                out.push(syntax_diagnostic(chunk, &e));
                return;
            }
        };
        if resolution.governing().is_none() {
            return;
        }

        let outline = Outline::build(chunk);
        let is_plain = |pointer: &str| outline.is_plain(pointer);
        let document = match yaml_to_json_value(&yaml, self.config.dialect_version, &is_plain) {
            Ok(v) => v,
            Err(reason) => {
                out.push(Diagnostic {
                    range: document_start(chunk),
                    severity: Severity::Error,
                    message: reason,
                    source: DiagnosticSource::Syntax,
                    schema: None,
                });
                return;
            }
        };

        let Some((schema, _, validator)) =
            self.schema_for_document(resolution, document_kind(&document))
        else {
            return;
        };

        for v in violations(&validator, &document) {
            let range = match outline.locate(&v.instance_path) {
                Some(entry) => TextRange::on_line(entry.line, entry.start, entry.end - entry.start),
                None => document_start(chunk),
            };
            out.push(Diagnostic {
                range,
                severity: Severity::Error,
                message: v.message,
                source: DiagnosticSource::Schema,
                schema: Some(schema.clone()),
            });
        }
    }

    // ─── Assistance ──────────────────────────────────────────────────

    /// Schema documentation for the key under `position`.
    pub fn hover(&self, path: &str, content: &str, position: Position) -> Option<Hover> {
        if !self.config.enable_hover {
            return None;
        }
        let chunk = chunk_at(content, position.line);
        let outline = Outline::build(&chunk);
        let (schema, root, _) = self.schema_for_document(&self.resolve(path), kind_of(&outline))?;
        hover_at(&self.graph(), &schema, &root, &outline, position)
    }

    /// Property names or values that may be typed at `position`.
    pub fn complete(&self, path: &str, content: &str, position: Position) -> Vec<CompletionItem> {
        if !self.config.enable_completion {
            return Vec::new();
        }
        let chunk = chunk_at(content, position.line);
        let outline = Outline::build(&chunk);
        let Some((_, root, _)) = self.schema_for_document(&self.resolve(path), kind_of(&outline))
        else {
            return Vec::new();
        };
        complete_at(&self.graph(), &root, &chunk, &outline, position)
    }

    /// Whitespace-normalized `content`, or `None` when nothing changes.
    pub fn format(&self, content: &str) -> Option<String> {
        if !self.config.enable_formatting {
            return None;
        }
        format_yaml(content)
    }

    // ─── Remote schemas ──────────────────────────────────────────────

    /// Record the outcome of fetching `id`.
    ///
    /// A delivered body is compiled with the inline bodies available for
    /// `$ref`; a body that fails to compile is recorded as a failure.
    pub fn store_fetched(&self, id: &SchemaId, result: Result<Value, FetchError>) {
        let entry = match result {
            Ok(body) => match self.compiler.compile(id, &body) {
                Ok(compiled) => {
                    tracing::info!(schema = %id, "remote schema loaded");
                    FetchedSchema::Loaded(compiled)
                }
                Err(e) => {
                    tracing::warn!(schema = %id, error = %e, "remote schema failed to compile");
                    FetchedSchema::Failed(e.to_string())
                }
            },
            Err(e) => {
                tracing::warn!(schema = %id, error = %e, "remote schema fetch failed");
                FetchedSchema::Failed(e.to_string())
            }
        };
        self.fetched.write().insert(id.clone(), entry);
    }

    /// Whether a fetch outcome has been recorded for `id`.
    pub fn has_fetched(&self, id: &SchemaId) -> bool {
        self.fetched.read().contains_key(id)
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn syntax_diagnostic(chunk: &DocumentChunk, err: &serde_yaml::Error) -> Diagnostic {
    let (line, character) = match err.location() {
        Some(loc) => (
            chunk.start_line + loc.line().saturating_sub(1) as u32,
            loc.column().saturating_sub(1) as u32,
        ),
        None => (chunk.first_content_line(), 0),
    };
    let message = err.to_string();
    let message = message
        .split(" at line ")
        .next()
        .unwrap_or(&message)
        .to_string();
    Diagnostic {
        range: TextRange::on_line(line, character, 1),
        severity: Severity::Error,
        message,
        source: DiagnosticSource::Syntax,
        schema: None,
    }
}

/// The trimmed text of a document's first content line.
fn document_start(chunk: &DocumentChunk) -> TextRange {
    let line = chunk.first_content_line();
    let content = chunk
        .text
        .split('\n')
        .nth((line - chunk.start_line) as usize)
        .unwrap_or("");
    let indent = content.chars().count() - content.trim_start().chars().count();
    let len = content.trim().chars().count().max(1);
    TextRange::on_line(line, indent as u32, len as u32)
}

/// The document containing `line`, or the whole buffer when the line sits
/// outside every non-blank document.
fn chunk_at(content: &str, line: u32) -> DocumentChunk {
    split_documents(content)
        .into_iter()
        .find(|c| c.contains_line(line))
        .unwrap_or_else(|| DocumentChunk {
            start_line: 0,
            text: content.to_string(),
        })
}

fn kind_of(outline: &Outline) -> Option<&str> {
    outline
        .scalar("/kind")
        .map(|s| s.raw.trim_matches(|c| c == '"' || c == '\''))
}
