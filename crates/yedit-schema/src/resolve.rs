//! # Schema Resolution
//!
//! Decides which single schema governs a document.
//!
//! 1. The first association, in configuration order, with a pattern
//!    matching the document path.
//! 2. Otherwise the first catch-all association.
//! 3. Otherwise, in Kubernetes mode, the built-in Kubernetes layer.
//! 4. Otherwise nothing: a miss. Syntax checks still run.
//!
//! A winning association without a body is fetched by identity when
//! remote fetch is allowed and is a miss when it is not. A disallowed
//! fetch is not a failure.

use serde::Serialize;
use yedit_core::{DiagnosticsConfiguration, SchemaAssociation, SchemaId};

use crate::kubernetes::kubernetes_schema_id;

/// Which rule produced the governing schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionLayer {
    /// An association whose pattern matched the path.
    Explicit,
    /// An association without patterns.
    CatchAll,
    /// The built-in Kubernetes schemas.
    Kubernetes,
}

impl std::fmt::Display for ResolutionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Explicit => "explicit",
            Self::CatchAll => "catch-all",
            Self::Kubernetes => "kubernetes",
        };
        f.write_str(s)
    }
}

/// Why no schema governs a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// No association matched and Kubernetes mode is off.
    NoMatch,
    /// The winning association has no body and remote fetch is disabled.
    RemoteFetchDisabled(SchemaId),
}

/// What a remote schema load left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// A body was delivered and compiled.
    Loaded,
    /// The fetch or the compilation failed.
    Failed(String),
}

/// The outcome of resolving a document against a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// A schema governs the document and is available.
    Governed {
        /// The governing schema.
        schema: SchemaId,
        /// The rule that chose it.
        layer: ResolutionLayer,
    },
    /// A schema was chosen but its body has not been delivered yet.
    AwaitingFetch {
        /// The schema being fetched.
        schema: SchemaId,
        /// The rule that chose it.
        layer: ResolutionLayer,
    },
    /// A schema was chosen but could not be loaded.
    Unavailable {
        /// The schema that failed.
        schema: SchemaId,
        /// The rule that chose it.
        layer: ResolutionLayer,
        /// Why loading failed.
        reason: String,
    },
    /// Nothing governs the document.
    Miss(MissReason),
}

impl Resolution {
    /// The chosen schema, whatever its availability.
    pub fn schema(&self) -> Option<&SchemaId> {
        match self {
            Self::Governed { schema, .. }
            | Self::AwaitingFetch { schema, .. }
            | Self::Unavailable { schema, .. } => Some(schema),
            Self::Miss(_) => None,
        }
    }

    /// The schema validating the document right now.
    pub fn governing(&self) -> Option<&SchemaId> {
        match self {
            Self::Governed { schema, .. } => Some(schema),
            _ => None,
        }
    }

    /// Whether nothing governs the document.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss(_))
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Governed { schema, layer } => write!(f, "{schema} ({layer})"),
            Self::AwaitingFetch { schema, layer } => {
                write!(f, "{schema} ({layer}, awaiting fetch)")
            }
            Self::Unavailable {
                schema,
                layer,
                reason,
            } => write!(f, "{schema} ({layer}, unavailable: {reason})"),
            Self::Miss(MissReason::NoMatch) => f.write_str("no schema"),
            Self::Miss(MissReason::RemoteFetchDisabled(schema)) => {
                write!(f, "no schema ({schema} requires remote fetch, which is disabled)")
            }
        }
    }
}

/// Pick the association governing `path`, before availability is considered.
pub fn select_association<'a>(
    config: &'a DiagnosticsConfiguration,
    path: &str,
) -> Option<(&'a SchemaAssociation, ResolutionLayer)> {
    let associations = &config.schema_associations;
    associations
        .iter()
        .find(|a| a.matches_path(path))
        .map(|a| (a, ResolutionLayer::Explicit))
        .or_else(|| {
            associations
                .iter()
                .find(|a| a.is_catch_all())
                .map(|a| (a, ResolutionLayer::CatchAll))
        })
}

/// Resolve `path` under `config`.
///
/// `fetched` reports what is known about body-less schemas.
pub fn resolve(
    config: &DiagnosticsConfiguration,
    path: &str,
    fetched: impl Fn(&SchemaId) -> Option<FetchState>,
) -> Resolution {
    let Some((assoc, layer)) = select_association(config, path) else {
        if config.kubernetes_mode {
            return Resolution::Governed {
                schema: kubernetes_schema_id(),
                layer: ResolutionLayer::Kubernetes,
            };
        }
        return Resolution::Miss(MissReason::NoMatch);
    };

    let schema = assoc.identity.clone();
    if assoc.body.is_some() {
        return Resolution::Governed { schema, layer };
    }
    if !config.allow_remote_schema_fetch {
        return Resolution::Miss(MissReason::RemoteFetchDisabled(schema));
    }
    match fetched(&schema) {
        Some(FetchState::Loaded) => Resolution::Governed { schema, layer },
        Some(FetchState::Failed(reason)) => Resolution::Unavailable {
            schema,
            layer,
            reason,
        },
        None => Resolution::AwaitingFetch { schema, layer },
    }
}
