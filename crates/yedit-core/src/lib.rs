//! # yedit-core — Foundational Types for the Schema-Aware YAML Editor
//!
//! Defines the vocabulary every other crate in the workspace shares: the
//! identities of schemas, sessions and languages, the association model,
//! the diagnostics configuration and the host-facing props. It depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `SchemaId`, `LanguageId` and
//!    `SessionId` are distinct types. `SchemaId` rejects blank input at
//!    construction and at deserialization.
//!
//! 2. **Patterns compile once.** `PathPattern` holds its compiled glob, so
//!    an invalid pattern is a configuration error before any session
//!    exists, never a silent non-match later.
//!
//! 3. **Configuration is a snapshot.** `DiagnosticsConfiguration` is
//!    replaced wholesale; `validate()` enforces identity uniqueness.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `yedit-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod diagnostic;
pub mod dialect;
pub mod error;
pub mod identity;
pub mod pattern;
pub mod props;

// Re-export primary types for ergonomic imports.
pub use config::{DiagnosticsConfiguration, SchemaAssociation};
pub use diagnostic::{Diagnostic, DiagnosticSource, Position, Severity, TextRange};
pub use dialect::DialectVersion;
pub use error::{ConfigurationError, SessionError, YeditError};
pub use identity::{LanguageId, SchemaId, SessionId};
pub use pattern::{normalize_document_path, PathPattern};
pub use props::{EditorProps, EditorSessionInit, Height};
