//! # yedit-schema — Reference Diagnostics Engine
//!
//! Everything the editor needs to know about a YAML document given a
//! `DiagnosticsConfiguration`: which schema governs it, what is wrong
//! with it, what a key means and what may be typed next.
//!
//! ## Pipeline (`service`)
//!
//! [`LanguageService`] is the entry point. Construction validates the
//! configuration and compiles every inline body; a service that exists is
//! usable. Each request then runs the same pipeline:
//!
//! 1. [`resolve`] picks the single governing schema (explicit pattern,
//!    catch-all, Kubernetes layer, or a miss).
//! 2. [`locate`] splits the stream into documents and outlines each one so
//!    violations can be mapped back to keys.
//! 3. [`convert`] turns parsed YAML into JSON under the dialect's rules.
//! 4. [`validate`] runs the compiled `jsonschema` validator.
//!
//! Hover and completion ([`assist`]) navigate the schema ([`navigate`])
//! along the outline path under the cursor.
//!
//! ## Remote Schemas (`fetch`)
//!
//! The engine performs no I/O. Bodies referenced only by identity are
//! reported as pending; the host runs a [`SchemaFetcher`] and hands the
//! outcome to [`LanguageService::store_fetched`].
//!
//! ## Crate Policy
//!
//! - Depends only on `yedit-core` internally.
//! - Schema compilation never reaches the network: `$ref`s resolve to
//!   other associations by identity or to the permissive schema.

pub mod assist;
pub mod convert;
pub mod fetch;
pub mod format;
pub mod kubernetes;
pub mod locate;
pub mod navigate;
pub mod resolve;
pub mod service;
pub mod validate;

pub use assist::{CompletionItem, CompletionKind, Hover};
pub use fetch::{FetchError, FileFetcher, InMemoryFetcher, SchemaFetcher};
pub use kubernetes::{kubernetes_schema_id, KubernetesCatalog};
pub use resolve::{MissReason, Resolution, ResolutionLayer};
pub use service::{Analysis, LanguageService};
pub use validate::{CompiledSchema, SchemaCompiler, Violation};
