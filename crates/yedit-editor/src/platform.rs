//! # Editor Platform Interface
//!
//! The live editable surface the adapter drives. A platform creates
//! surfaces; a surface owns the visible buffer, renders markers and
//! reports edits.
//!
//! ## Change Notifications
//!
//! Listeners receive the raw platform payload. Some platforms deliver an
//! undefined value for an emptied buffer, so the payload is optional; the
//! adapter normalizes `None` to the empty string. Platforms fire listeners
//! for every content change, programmatic `set_value` included; telling
//! the two apart is the adapter's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use yedit_core::{Diagnostic, Height, LanguageId};

/// Callback receiving the raw change payload.
pub type ChangeListener = Box<dyn FnMut(Option<&str>)>;

/// What a platform needs to create a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceInit {
    /// Initial buffer.
    pub content: String,
    /// Syntax mode.
    pub language: LanguageId,
    /// Sizing hint, passed through unchanged.
    pub height: Height,
    /// Document identity.
    pub path: String,
}

/// A partial update of surface options. `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceOptions {
    /// Whether user input is refused.
    pub read_only: Option<bool>,
}

impl SurfaceOptions {
    /// Options changing only the read-only flag.
    pub fn read_only(read_only: bool) -> Self {
        Self {
            read_only: Some(read_only),
        }
    }
}

/// Failures reported by a platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The surface could not be created.
    #[error("failed to mount editor surface: {0}")]
    MountFailed(String),

    /// The surface was used after `dispose`.
    #[error("editor surface has been disposed")]
    Disposed,
}

/// A live editable buffer.
pub trait Surface {
    /// Apply an options patch to the live instance.
    fn update_options(&mut self, options: SurfaceOptions);

    /// Replace the whole buffer. Listeners are notified.
    fn set_value(&mut self, text: &str);

    /// The current buffer.
    fn value(&self) -> String;

    /// Register a change listener.
    fn subscribe(&mut self, listener: ChangeListener);

    /// Replace the rendered diagnostics.
    fn set_markers(&mut self, markers: &[Diagnostic]);

    /// Release the surface. Further calls are no-ops.
    fn dispose(&mut self);
}

/// Creates surfaces.
pub trait EditorPlatform {
    /// The surface type this platform produces.
    type Surface: Surface;

    /// Create a surface attached to the host container.
    fn mount(&self, init: SurfaceInit) -> Result<Self::Surface, PlatformError>;
}
