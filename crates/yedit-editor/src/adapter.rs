//! # Schema-Aware Editor Adapter
//!
//! Bridges host props to a diagnostics engine and a live editable surface.
//!
//! ## Lifecycle
//!
//! 1. `initialize` registers a `DiagnosticsConfiguration` for the adapter's
//!    language. Registration is all-or-nothing and must precede `mount`.
//! 2. `mount` creates the surface, applies the read-only flag to the live
//!    instance, subscribes to edits and runs a first diagnostics pass.
//! 3. User edits are reported to `on_content_changed` handlers
//!    synchronously with the full buffer text. They mark the session dirty;
//!    `tick` drains the dirty flag into a diagnostics pass.
//! 4. `reconfigure` swaps the configuration through the `ConfigChanging`
//!    state. `unmount` disposes the surface.
//!
//! ## Change Notifications
//!
//! Platforms fire their change listener for programmatic replacement as
//! well as for typing. The adapter suppresses notifications while it
//! writes to the surface itself (`replace_content`, read-only toggles), so
//! handlers only ever see user edits.
//!
//! ## Remote Schemas
//!
//! When the governing association has no body and remote fetch is
//! allowed, the adapter queues a [`FetchRequest`] stamped with the current
//! [`ValidationTicket`]. A delivery whose ticket no longer matches the
//! session (unmounted, remounted or reconfigured since) is discarded.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use yedit_core::{
    Diagnostic, DiagnosticsConfiguration, EditorSessionInit, LanguageId, Position, SchemaId,
    SessionId,
};
use yedit_schema::{CompletionItem, FetchError, Hover, Resolution, SchemaFetcher};

use crate::engine::{DiagnosticsEngine, EngineHandle};
use crate::error::AdapterError;
use crate::platform::{ChangeListener, EditorPlatform, Surface, SurfaceInit, SurfaceOptions};
use crate::registry::EngineRegistry;
use crate::session::{Session, SessionState, SessionTransitionRecord, ValidationTicket};

static NEXT_MODEL: AtomicU64 = AtomicU64::new(1);

/// Document identity for a session mounted without a path.
fn next_model_path() -> String {
    format!("inmemory://model/{}", NEXT_MODEL.fetch_add(1, Ordering::Relaxed))
}

// ─── Handles & Requests ──────────────────────────────────────────────

/// Returned by a successful `mount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorHandle {
    /// The mounted session.
    pub session: SessionId,
    /// Session generation at mount time.
    pub generation: u64,
    /// Document identity used for association matching.
    pub path: String,
}

/// A body-less schema the current session is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Identity to fetch.
    pub schema: SchemaId,
    /// Session generation the request was issued for.
    pub ticket: ValidationTicket,
}

/// What happened to a fetch result handed to `deliver_fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Stored with the engine and diagnostics refreshed.
    Applied,
    /// The issuing session generation is gone; the result was dropped.
    Discarded,
}

// ─── Shared Session State ────────────────────────────────────────────

type ContentHandler = Box<dyn FnMut(&str)>;

/// State reachable from both the adapter and the surface listener.
#[derive(Default)]
struct Shared {
    session: Session,
    content: String,
    path: String,
    read_only: bool,
    dirty: bool,
    suppress: bool,
    handlers: Vec<ContentHandler>,
    diagnostics: Vec<Diagnostic>,
    resolution: Option<Resolution>,
    requested: HashSet<SchemaId>,
    /// Engine registration the `requested` set belongs to.
    registration: Option<u64>,
}

impl Shared {
    /// Record a user edit and notify handlers.
    ///
    /// Handlers are taken out while they run so a handler may call back
    /// into the adapter's read accessors.
    fn user_edit(shared: &Rc<RefCell<Shared>>, payload: Option<&str>) {
        let text = payload.unwrap_or_default().to_string();
        let mut handlers = {
            let mut s = shared.borrow_mut();
            if s.suppress || !s.session.state().is_live() {
                return;
            }
            s.content = text.clone();
            s.dirty = true;
            std::mem::take(&mut s.handlers)
        };
        for handler in handlers.iter_mut() {
            handler(&text);
        }
        let mut s = shared.borrow_mut();
        handlers.append(&mut s.handlers);
        s.handlers = handlers;
    }
}

// ─── Adapter ─────────────────────────────────────────────────────────

/// One schema-aware editing surface.
pub struct EditorAdapter<P: EditorPlatform> {
    platform: P,
    engine: Arc<dyn DiagnosticsEngine>,
    language: LanguageId,
    surface: Option<P::Surface>,
    shared: Rc<RefCell<Shared>>,
    fetch_queue: VecDeque<FetchRequest>,
}

impl<P: EditorPlatform> std::fmt::Debug for EditorAdapter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("EditorAdapter")
            .field("language", &self.language)
            .field("session", &shared.session.id())
            .field("state", &shared.session.state())
            .field("generation", &shared.session.generation())
            .field("path", &shared.path)
            .finish()
    }
}

impl<P: EditorPlatform> EditorAdapter<P> {
    /// An adapter for `yaml` backed by the process-wide registry.
    pub fn new(platform: P) -> Self {
        Self::with_engine(platform, EngineRegistry::global())
    }

    /// An adapter for `yaml` backed by `engine`.
    pub fn with_engine(platform: P, engine: Arc<dyn DiagnosticsEngine>) -> Self {
        Self {
            platform,
            engine,
            language: LanguageId::yaml(),
            surface: None,
            shared: Rc::new(RefCell::new(Shared::default())),
            fetch_queue: VecDeque::new(),
        }
    }

    /// Override the syntax mode.
    pub fn with_language(mut self, language: LanguageId) -> Self {
        self.language = language;
        self
    }

    // ─── Configuration ───────────────────────────────────────────────

    /// Register `config` for this adapter's language.
    ///
    /// Every session created with the same language inherits the
    /// registration. On error nothing is registered and an earlier
    /// registration stays in effect.
    pub fn initialize(&self, config: DiagnosticsConfiguration) -> Result<EngineHandle, AdapterError> {
        Ok(self.engine.register(&self.language, config)?)
    }

    /// Apply a new configuration to the mounted session.
    ///
    /// Passes through `ConfigChanging`. On success the cached resolution is
    /// dropped, the generation advances and diagnostics are recomputed. On
    /// failure the session returns to `Mounted` under the previous
    /// configuration.
    pub fn reconfigure(
        &mut self,
        config: DiagnosticsConfiguration,
    ) -> Result<EngineHandle, AdapterError> {
        self.shared
            .borrow_mut()
            .session
            .begin_reconfigure("diagnostics configuration changed")?;

        let handle = match self.engine.register(&self.language, config) {
            Ok(handle) => handle,
            Err(e) => {
                self.shared
                    .borrow_mut()
                    .session
                    .finish_reconfigure(false, "configuration rejected")?;
                return Err(e.into());
            }
        };

        {
            let mut s = self.shared.borrow_mut();
            s.session.finish_reconfigure(true, "configuration applied")?;
            s.resolution = None;
            s.requested.clear();
        }
        self.fetch_queue.clear();
        self.run_diagnostics();

        let s = self.shared.borrow();
        tracing::info!(
            session = %s.session.id(),
            generation = s.session.generation(),
            registration = handle.generation,
            "editor reconfigured"
        );
        Ok(handle)
    }

    // ─── Lifecycle ───────────────────────────────────────────────────

    /// Create the live surface.
    pub fn mount(&mut self, init: EditorSessionInit) -> Result<EditorHandle, AdapterError> {
        if self.engine.generation(&self.language).is_none() {
            return Err(AdapterError::NotInitialized(self.language.clone()));
        }
        self.shared
            .borrow()
            .session
            .require_state(SessionState::Unmounted, SessionState::Mounted)?;

        let path = init.path.unwrap_or_else(next_model_path);
        let mut surface = self.platform.mount(SurfaceInit {
            content: init.content.clone(),
            language: self.language.clone(),
            height: init.height,
            path: path.clone(),
        })?;
        surface.update_options(SurfaceOptions::read_only(init.read_only));

        let shared = Rc::clone(&self.shared);
        let listener: ChangeListener = Box::new(move |payload| Shared::user_edit(&shared, payload));
        surface.subscribe(listener);

        {
            let mut s = self.shared.borrow_mut();
            s.session.mount("surface mounted")?;
            s.content = init.content;
            s.path = path.clone();
            s.read_only = init.read_only;
            s.dirty = false;
            s.suppress = false;
            s.diagnostics.clear();
            s.resolution = None;
            s.requested.clear();
        }
        self.surface = Some(surface);
        self.run_diagnostics();

        let s = self.shared.borrow();
        tracing::info!(
            session = %s.session.id(),
            generation = s.session.generation(),
            language = %self.language,
            path = %path,
            read_only = s.read_only,
            "editor mounted"
        );
        Ok(EditorHandle {
            session: s.session.id(),
            generation: s.session.generation(),
            path,
        })
    }

    /// Dispose the surface. Outstanding fetches become stale.
    pub fn unmount(&mut self) -> Result<(), AdapterError> {
        self.shared.borrow_mut().session.unmount("surface disposed")?;
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
        }
        self.fetch_queue.clear();
        let mut s = self.shared.borrow_mut();
        s.dirty = false;
        s.diagnostics.clear();
        s.resolution = None;
        s.requested.clear();
        tracing::info!(session = %s.session.id(), "editor unmounted");
        Ok(())
    }

    // ─── Content ─────────────────────────────────────────────────────

    /// Register a handler for user edits.
    ///
    /// The handler receives the full buffer text once per edit batch. It is
    /// never called for `replace_content` or read-only toggles.
    pub fn on_content_changed(&mut self, handler: impl FnMut(&str) + 'static) {
        self.shared.borrow_mut().handlers.push(Box::new(handler));
    }

    /// Toggle interactivity of the live surface.
    pub fn set_read_only(&mut self, read_only: bool) -> Result<(), AdapterError> {
        let surface = self.surface.as_mut().ok_or(AdapterError::NotMounted)?;
        self.shared.borrow_mut().suppress = true;
        surface.update_options(SurfaceOptions::read_only(read_only));
        let mut s = self.shared.borrow_mut();
        s.suppress = false;
        s.read_only = read_only;
        Ok(())
    }

    /// Replace the buffer on the host's behalf. Handlers are not notified.
    pub fn replace_content(&mut self, text: &str) -> Result<(), AdapterError> {
        let surface = self.surface.as_mut().ok_or(AdapterError::NotMounted)?;
        self.shared.borrow_mut().suppress = true;
        surface.set_value(text);
        {
            let mut s = self.shared.borrow_mut();
            s.suppress = false;
            s.content = text.to_string();
        }
        self.run_diagnostics();
        Ok(())
    }

    /// Rewrite the buffer with the engine's formatter.
    ///
    /// Formatting is an edit made through the editor, so handlers are
    /// notified. Returns whether the buffer changed; a read-only session is
    /// never changed.
    pub fn format_document(&mut self) -> Result<bool, AdapterError> {
        let surface = self.surface.as_mut().ok_or(AdapterError::NotMounted)?;
        let (read_only, content) = {
            let s = self.shared.borrow();
            (s.read_only, s.content.clone())
        };
        if read_only {
            return Ok(false);
        }
        let Some(formatted) = self.engine.format(&self.language, &content) else {
            return Ok(false);
        };
        surface.set_value(&formatted);
        self.shared.borrow_mut().content = formatted;
        self.run_diagnostics();
        Ok(true)
    }

    /// Run diagnostics if user edits arrived since the last pass.
    pub fn tick(&mut self) -> bool {
        let dirty = {
            let s = self.shared.borrow();
            s.dirty && s.session.state() == SessionState::Mounted
        };
        if dirty {
            self.run_diagnostics();
        }
        dirty
    }

    // ─── Remote schemas ──────────────────────────────────────────────

    /// Drain the queued fetch requests.
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        self.fetch_queue.drain(..).collect()
    }

    /// Hand over the outcome of a fetch.
    pub fn deliver_fetch(
        &mut self,
        request: &FetchRequest,
        result: Result<Value, FetchError>,
    ) -> Delivery {
        if !self.shared.borrow().session.accepts(&request.ticket) {
            tracing::debug!(
                schema = %request.schema,
                generation = request.ticket.generation,
                "discarding stale schema fetch"
            );
            return Delivery::Discarded;
        }
        self.engine.store_fetched(&self.language, &request.schema, result);
        self.run_diagnostics();
        Delivery::Applied
    }

    /// Fetch and deliver every queued request through `fetcher`.
    pub fn run_pending_fetches(&mut self, fetcher: &dyn SchemaFetcher) -> Vec<Delivery> {
        self.take_fetch_requests()
            .iter()
            .map(|request| {
                let result = fetcher.fetch(&request.schema);
                self.deliver_fetch(request, result)
            })
            .collect()
    }

    // ─── Queries ─────────────────────────────────────────────────────

    /// Diagnostics from the last pass.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.shared.borrow().diagnostics.clone()
    }

    /// Which schema governed the last pass.
    pub fn resolution(&self) -> Option<Resolution> {
        self.shared.borrow().resolution.clone()
    }

    /// The current buffer.
    pub fn content(&self) -> String {
        self.shared.borrow().content.clone()
    }

    /// Length of the current buffer in characters.
    pub fn content_len(&self) -> usize {
        self.shared.borrow().content.chars().count()
    }

    /// Schema documentation for the key at `line`/`character`.
    pub fn hover(&self, line: u32, character: u32) -> Option<Hover> {
        let (path, content) = self.live_document()?;
        self.engine
            .hover(&self.language, &path, &content, Position::new(line, character))
    }

    /// Completion proposals at `line`/`character`.
    pub fn completions(&self, line: u32, character: u32) -> Vec<CompletionItem> {
        let Some((path, content)) = self.live_document() else {
            return Vec::new();
        };
        self.engine
            .complete(&self.language, &path, &content, Position::new(line, character))
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.shared.borrow().session.state()
    }

    /// Session identity.
    pub fn session_id(&self) -> SessionId {
        self.shared.borrow().session.id()
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.shared.borrow().session.generation()
    }

    /// Every recorded state transition.
    pub fn transitions(&self) -> Vec<SessionTransitionRecord> {
        self.shared.borrow().session.transitions().to_vec()
    }

    /// Whether the session refuses user edits.
    pub fn is_read_only(&self) -> bool {
        self.shared.borrow().read_only
    }

    /// Document identity of the mounted session.
    pub fn path(&self) -> String {
        self.shared.borrow().path.clone()
    }

    /// The language this adapter registers and mounts under.
    pub fn language(&self) -> &LanguageId {
        &self.language
    }

    /// The live surface, when mounted.
    pub fn surface(&self) -> Option<&P::Surface> {
        self.surface.as_ref()
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn live_document(&self) -> Option<(String, String)> {
        self.surface.as_ref()?;
        let s = self.shared.borrow();
        Some((s.path.clone(), s.content.clone()))
    }

    /// Analyze the buffer, queue a fetch if one is needed and render
    /// markers.
    fn run_diagnostics(&mut self) {
        let (path, content, ticket) = {
            let s = self.shared.borrow();
            (s.path.clone(), s.content.clone(), s.session.ticket())
        };
        let Some(analysis) = self.engine.analyze(&self.language, &path, &content) else {
            return;
        };

        let registration = self.engine.generation(&self.language);
        let markers = {
            let mut s = self.shared.borrow_mut();
            // A new registration starts with an empty fetch cache.
            if s.registration != registration {
                s.registration = registration;
                s.requested.clear();
                self.fetch_queue.clear();
            }
            if let Some(schema) = analysis.pending_fetch {
                if s.requested.insert(schema.clone()) {
                    tracing::debug!(schema = %schema, generation = ticket.generation, "schema fetch queued");
                    self.fetch_queue.push_back(FetchRequest { schema, ticket });
                }
            }
            s.dirty = false;
            s.diagnostics = analysis.diagnostics;
            s.resolution = Some(analysis.resolution);
            s.diagnostics.clone()
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.set_markers(&markers);
        }
    }
}
