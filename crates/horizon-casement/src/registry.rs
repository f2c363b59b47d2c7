//! Registry mapping native window identifiers to window objects.
//!
//! Native event delivery only hands back a window identifier. The registry
//! owns every live window so the dispatch point can route each native event
//! to the object that must handle it.

use std::collections::HashMap;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use tracing::{debug, warn};

use horizon_casement_core::logging::targets;
use horizon_casement_core::{CasementError, Result, WindowId};

/// Owning map from [`WindowId`] to window objects.
///
/// Window state is confined to the event-loop thread; the lock only guards
/// the map against registration racing with lookups.
///
/// # Example
///
/// ```ignore
/// let registry = WindowRegistry::new();
/// registry.register(window.id(), window)?;
///
/// registry.with_window_mut(id, |window| window.set_title("Renamed"));
///
/// let window = registry.unregister(id);
/// ```
pub struct WindowRegistry<W> {
    windows: RwLock<HashMap<WindowId, W>>,
}

impl<W> WindowRegistry<W> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Register a window under its native identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CasementError::DuplicateWindow`] if the identifier is
    /// already registered; the existing entry is left untouched and the new
    /// window is dropped.
    pub fn register(&self, id: WindowId, window: W) -> Result<()> {
        let mut windows = self.windows.write();
        if windows.contains_key(&id) {
            warn!(target: targets::REGISTRY, %id, "window id already registered");
            return Err(CasementError::DuplicateWindow(id));
        }
        windows.insert(id, window);
        debug!(target: targets::REGISTRY, %id, count = windows.len(), "window registered");
        Ok(())
    }

    /// Remove a window, handing ownership back to the caller.
    ///
    /// Removing an identifier that is not registered is a no-op.
    pub fn unregister(&self, id: WindowId) -> Option<W> {
        let window = self.windows.write().remove(&id);
        match window {
            Some(_) => debug!(target: targets::REGISTRY, %id, "window unregistered"),
            None => warn!(target: targets::REGISTRY, %id, "unregistering unknown window"),
        }
        window
    }

    /// Look up a window by identifier.
    ///
    /// The returned reference holds a read lock on the registry for its
    /// lifetime.
    pub fn lookup(&self, id: WindowId) -> Option<WindowRef<'_, W>> {
        RwLockReadGuard::try_map(self.windows.read(), |windows| windows.get(&id))
            .ok()
            .map(|guard| WindowRef { guard })
    }

    /// Execute a closure with mutable access to a window.
    ///
    /// Returns `Some(result)` if the window exists, `None` otherwise.
    pub fn with_window_mut<F, R>(&self, id: WindowId, f: F) -> Option<R>
    where
        F: FnOnce(&mut W) -> R,
    {
        let mut guard = self.windows.write();
        guard.get_mut(&id).map(f)
    }

    /// Check if a window is registered.
    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.read().contains_key(&id)
    }

    /// Number of registered windows.
    pub fn len(&self) -> usize {
        self.windows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.read().is_empty()
    }

    /// All registered identifiers.
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.read().keys().copied().collect()
    }

    /// Remove and return every window.
    pub fn drain(&self) -> Vec<(WindowId, W)> {
        self.windows.write().drain().collect()
    }
}

impl<W> Default for WindowRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> std::fmt::Debug for WindowRegistry<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

/// A reference to a registered window.
///
/// Holds a read lock on the registry for the duration of its lifetime.
pub struct WindowRef<'a, W> {
    guard: MappedRwLockReadGuard<'a, W>,
}

impl<W> std::ops::Deref for WindowRef<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        &self.guard
    }
}
