//! # Engine Registry
//!
//! Process-wide map from language id to a compiled `LanguageService`.
//!
//! ## Replacement Semantics
//!
//! Registration is idempotent-replace. A second registration for the same
//! language fully supersedes the first and receives a higher generation.
//! The new configuration is compiled before the write lock is taken, so a
//! failing configuration leaves the previous registration untouched and
//! readers never observe a half-built service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;
use yedit_core::{ConfigurationError, DiagnosticsConfiguration, LanguageId, Position, SchemaId};
use yedit_schema::{Analysis, CompletionItem, FetchError, Hover, LanguageService};

use crate::engine::{DiagnosticsEngine, EngineHandle};

#[derive(Debug)]
struct Registration {
    generation: u64,
    service: Arc<LanguageService>,
}

/// Language registrations backed by [`LanguageService`].
#[derive(Debug, Default)]
pub struct EngineRegistry {
    registrations: RwLock<HashMap<LanguageId, Registration>>,
    last_generation: AtomicU64,
}

static GLOBAL: OnceLock<Arc<EngineRegistry>> = OnceLock::new();

impl EngineRegistry {
    /// An empty registry, independent of the global one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every adapter in the process.
    pub fn global() -> Arc<EngineRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(EngineRegistry::new())))
    }

    /// The service registered for `language`.
    pub fn service(&self, language: &LanguageId) -> Option<Arc<LanguageService>> {
        self.registrations
            .read()
            .get(language)
            .map(|r| Arc::clone(&r.service))
    }

    /// Languages with a registration.
    pub fn languages(&self) -> Vec<LanguageId> {
        self.registrations.read().keys().cloned().collect()
    }
}

impl DiagnosticsEngine for EngineRegistry {
    fn register(
        &self,
        language: &LanguageId,
        config: DiagnosticsConfiguration,
    ) -> Result<EngineHandle, ConfigurationError> {
        let associations = config.schema_associations.len();
        let service = match LanguageService::new(config) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                tracing::warn!(language = %language, error = %e, "diagnostics registration rejected");
                return Err(e);
            }
        };

        let generation = self.last_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let replaced = self
            .registrations
            .write()
            .insert(
                language.clone(),
                Registration {
                    generation,
                    service,
                },
            )
            .is_some();

        tracing::info!(
            language = %language,
            generation,
            associations,
            replaced,
            "diagnostics configuration registered"
        );
        Ok(EngineHandle {
            language: language.clone(),
            generation,
        })
    }

    fn unregister(&self, language: &LanguageId) -> bool {
        let removed = self.registrations.write().remove(language).is_some();
        if removed {
            tracing::info!(language = %language, "diagnostics configuration unregistered");
        }
        removed
    }

    fn generation(&self, language: &LanguageId) -> Option<u64> {
        self.registrations.read().get(language).map(|r| r.generation)
    }

    fn analyze(&self, language: &LanguageId, path: &str, content: &str) -> Option<Analysis> {
        Some(self.service(language)?.analyze(path, content))
    }

    fn hover(
        &self,
        language: &LanguageId,
        path: &str,
        content: &str,
        position: Position,
    ) -> Option<Hover> {
        self.service(language)?.hover(path, content, position)
    }

    fn complete(
        &self,
        language: &LanguageId,
        path: &str,
        content: &str,
        position: Position,
    ) -> Vec<CompletionItem> {
        self.service(language)
            .map(|s| s.complete(path, content, position))
            .unwrap_or_default()
    }

    fn format(&self, language: &LanguageId, content: &str) -> Option<String> {
        self.service(language)?.format(content)
    }

    fn store_fetched(
        &self,
        language: &LanguageId,
        schema: &SchemaId,
        result: Result<Value, FetchError>,
    ) {
        if let Some(service) = self.service(language) {
            service.store_fetched(schema, result);
        }
    }
}
