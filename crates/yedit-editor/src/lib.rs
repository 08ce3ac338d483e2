//! # yedit-editor — Schema-Aware Editor Adapter
//!
//! Connects host props to a diagnostics engine and a live editable
//! surface. The adapter owns one editing session; the engine registry is
//! shared by every session in the process.
//!
//! ## Components
//!
//! - **Engine** (`engine.rs`, `registry.rs`): the `DiagnosticsEngine`
//!   capability and `EngineRegistry`, its process-wide implementation
//!   keyed by language id.
//!
//! - **Platform** (`platform.rs`, `memory.rs`): the `EditorPlatform` and
//!   `Surface` capabilities, plus `MemoryPlatform`, a headless platform
//!   with simulated user input.
//!
//! - **Session** (`session.rs`): `Unmounted → Mounted → (ConfigChanging →
//!   Mounted)* → Unmounted`, with a generation counter and
//!   `ValidationTicket`s for discarding stale results.
//!
//! - **Adapter** (`adapter.rs`): `EditorAdapter`, the operations a host
//!   calls.
//!
//! ## Threading
//!
//! Sessions are single-threaded and event-driven; adapter state is shared
//! with surface listeners through `Rc<RefCell<_>>`. The registry is
//! `Sync` and guarded by a `parking_lot::RwLock`.

pub mod adapter;
pub mod engine;
pub mod error;
pub mod memory;
pub mod platform;
pub mod registry;
pub mod session;

// ─── Adapter re-exports ─────────────────────────────────────────────

pub use adapter::{Delivery, EditorAdapter, EditorHandle, FetchRequest};
pub use error::AdapterError;

// ─── Engine re-exports ──────────────────────────────────────────────

pub use engine::{DiagnosticsEngine, EngineHandle};
pub use registry::EngineRegistry;

// ─── Platform re-exports ────────────────────────────────────────────

pub use memory::{MemoryPlatform, MemorySurface};
pub use platform::{
    ChangeListener, EditorPlatform, PlatformError, Surface, SurfaceInit, SurfaceOptions,
};

// ─── Session re-exports ─────────────────────────────────────────────

pub use session::{Session, SessionState, SessionTransitionRecord, ValidationTicket};
