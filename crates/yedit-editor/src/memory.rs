//! # In-Memory Platform
//!
//! A headless [`EditorPlatform`] for tests and command-line hosts. Surfaces
//! are cheap handles onto shared state, so a test can keep a handle to the
//! surface the adapter mounted and drive it as a user would.
//!
//! Simulated user input honours the read-only flag: while read-only, input
//! is refused and no listener fires. Programmatic `set_value` is always
//! applied and always notifies, as on real platforms.

use std::cell::RefCell;
use std::rc::Rc;

use yedit_core::{Diagnostic, Height, LanguageId};

use crate::platform::{
    ChangeListener, EditorPlatform, PlatformError, Surface, SurfaceInit, SurfaceOptions,
};

#[derive(Default)]
struct SurfaceState {
    value: String,
    language: LanguageId,
    height: Height,
    path: String,
    read_only: bool,
    disposed: bool,
    markers: Vec<Diagnostic>,
    option_updates: Vec<SurfaceOptions>,
    listeners: Vec<ChangeListener>,
}

/// Handle onto an in-memory surface. Clones share the same surface.
#[derive(Clone, Default)]
pub struct MemorySurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl std::fmt::Debug for MemorySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemorySurface")
            .field("path", &state.path)
            .field("read_only", &state.read_only)
            .field("disposed", &state.disposed)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl MemorySurface {
    fn new(init: SurfaceInit) -> Self {
        Self {
            state: Rc::new(RefCell::new(SurfaceState {
                value: init.content,
                language: init.language,
                height: init.height,
                path: init.path,
                ..SurfaceState::default()
            })),
        }
    }

    // ─── Simulated user input ────────────────────────────────────────

    /// Replace the buffer as a user edit. Returns whether it was accepted.
    pub fn simulate_input(&self, text: &str) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.read_only || state.disposed {
                return false;
            }
            state.value = text.to_string();
        }
        self.notify(Some(text));
        true
    }

    /// Append text at the end of the buffer as a user edit.
    pub fn simulate_typing(&self, text: &str) -> bool {
        let next = format!("{}{}", self.state.borrow().value, text);
        self.simulate_input(&next)
    }

    /// Clear the buffer the way platforms that report `undefined` do.
    pub fn simulate_clear(&self) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.read_only || state.disposed {
                return false;
            }
            state.value.clear();
        }
        self.notify(None);
        true
    }

    // ─── Inspection ──────────────────────────────────────────────────

    /// Whether user input is currently refused.
    pub fn is_read_only(&self) -> bool {
        self.state.borrow().read_only
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// The markers last rendered.
    pub fn markers(&self) -> Vec<Diagnostic> {
        self.state.borrow().markers.clone()
    }

    /// Every options patch applied, in order.
    pub fn option_updates(&self) -> Vec<SurfaceOptions> {
        self.state.borrow().option_updates.clone()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// The syntax mode the surface was created with.
    pub fn language(&self) -> LanguageId {
        self.state.borrow().language.clone()
    }

    /// The sizing hint the surface was created with.
    pub fn height(&self) -> Height {
        self.state.borrow().height.clone()
    }

    /// The document identity the surface was created with.
    pub fn path(&self) -> String {
        self.state.borrow().path.clone()
    }

    /// Call every listener without holding the state borrow, so listeners
    /// may read the surface.
    fn notify(&self, payload: Option<&str>) {
        let mut listeners = std::mem::take(&mut self.state.borrow_mut().listeners);
        for listener in listeners.iter_mut() {
            listener(payload);
        }
        let mut state = self.state.borrow_mut();
        listeners.append(&mut state.listeners);
        state.listeners = listeners;
    }
}

impl Surface for MemorySurface {
    fn update_options(&mut self, options: SurfaceOptions) {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return;
        }
        if let Some(read_only) = options.read_only {
            state.read_only = read_only;
        }
        state.option_updates.push(options);
    }

    fn set_value(&mut self, text: &str) {
        {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.value = text.to_string();
        }
        self.notify(Some(text));
    }

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn subscribe(&mut self, listener: ChangeListener) {
        let mut state = self.state.borrow_mut();
        if !state.disposed {
            state.listeners.push(listener);
        }
    }

    fn set_markers(&mut self, markers: &[Diagnostic]) {
        let mut state = self.state.borrow_mut();
        if !state.disposed {
            state.markers = markers.to_vec();
        }
    }

    fn dispose(&mut self) {
        let mut state = self.state.borrow_mut();
        state.disposed = true;
        state.listeners.clear();
        state.markers.clear();
    }
}

/// Platform producing [`MemorySurface`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlatform {
    mounted: Rc<RefCell<Vec<MemorySurface>>>,
    fail_next_mount: Rc<RefCell<Option<String>>>,
}

impl MemoryPlatform {
    /// A platform with no surfaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently mounted surface.
    pub fn last_surface(&self) -> Option<MemorySurface> {
        self.mounted.borrow().last().cloned()
    }

    /// Number of surfaces mounted so far.
    pub fn mount_count(&self) -> usize {
        self.mounted.borrow().len()
    }

    /// Make the next `mount` fail with `reason`.
    pub fn fail_next_mount(&self, reason: impl Into<String>) {
        *self.fail_next_mount.borrow_mut() = Some(reason.into());
    }
}

impl EditorPlatform for MemoryPlatform {
    type Surface = MemorySurface;

    fn mount(&self, init: SurfaceInit) -> Result<MemorySurface, PlatformError> {
        if let Some(reason) = self.fail_next_mount.borrow_mut().take() {
            return Err(PlatformError::MountFailed(reason));
        }
        let surface = MemorySurface::new(init);
        self.mounted.borrow_mut().push(surface.clone());
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount(platform: &MemoryPlatform, content: &str) -> MemorySurface {
        platform
            .mount(SurfaceInit {
                content: content.to_string(),
                language: LanguageId::yaml(),
                height: Height::Pixels(400),
                path: "inmemory://model/1".to_string(),
            })
            .unwrap()
    }

    fn recorder(surface: &mut MemorySurface) -> Rc<RefCell<Vec<Option<String>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        surface.subscribe(Box::new(move |p| sink.borrow_mut().push(p.map(str::to_string))));
        seen
    }

    #[test]
    fn test_user_input_notifies_with_full_text() {
        let platform = MemoryPlatform::new();
        let mut surface = mount(&platform, "a: 1\n");
        let seen = recorder(&mut surface);
        assert!(surface.simulate_typing("b: 2\n"));
        assert_eq!(surface.value(), "a: 1\nb: 2\n");
        assert_eq!(*seen.borrow(), vec![Some("a: 1\nb: 2\n".to_string())]);
    }

    #[test]
    fn test_read_only_refuses_input() {
        let platform = MemoryPlatform::new();
        let mut surface = mount(&platform, "a: 1\n");
        let seen = recorder(&mut surface);
        surface.update_options(SurfaceOptions::read_only(true));
        assert!(!surface.simulate_input("changed"));
        assert!(!surface.simulate_clear());
        assert_eq!(surface.value(), "a: 1\n");
        assert!(seen.borrow().is_empty());
        assert_eq!(surface.option_updates(), vec![SurfaceOptions::read_only(true)]);
    }

    #[test]
    fn test_clear_reports_undefined_payload() {
        let platform = MemoryPlatform::new();
        let mut surface = mount(&platform, "a: 1\n");
        let seen = recorder(&mut surface);
        assert!(surface.simulate_clear());
        assert_eq!(*seen.borrow(), vec![None]);
    }

    #[test]
    fn test_set_value_notifies_even_when_read_only() {
        let platform = MemoryPlatform::new();
        let mut surface = mount(&platform, "");
        let seen = recorder(&mut surface);
        surface.update_options(SurfaceOptions::read_only(true));
        surface.set_value("x: 1");
        assert_eq!(surface.value(), "x: 1");
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_listener_may_read_surface() {
        let platform = MemoryPlatform::new();
        let mut surface = mount(&platform, "");
        let handle = surface.clone();
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&seen);
        surface.subscribe(Box::new(move |_| *sink.borrow_mut() = handle.value()));
        surface.simulate_input("k: v");
        assert_eq!(*seen.borrow(), "k: v");
    }

    #[test]
    fn test_dispose_detaches_everything() {
        let platform = MemoryPlatform::new();
        let mut surface = mount(&platform, "a: 1");
        let _seen = recorder(&mut surface);
        surface.dispose();
        assert!(surface.is_disposed());
        assert_eq!(surface.listener_count(), 0);
        assert!(!surface.simulate_input("b"));
    }

    #[test]
    fn test_platform_tracks_mounts_and_failures() {
        let platform = MemoryPlatform::new();
        let surface = mount(&platform, "a: 1");
        assert_eq!(platform.mount_count(), 1);
        assert_eq!(platform.last_surface().unwrap().path(), surface.path());
        assert_eq!(surface.height(), Height::Pixels(400));

        platform.fail_next_mount("no container");
        let err = platform
            .mount(SurfaceInit {
                content: String::new(),
                language: LanguageId::yaml(),
                height: Height::default(),
                path: "x".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, PlatformError::MountFailed("no container".to_string()));
        assert_eq!(platform.mount_count(), 1);
    }
}
