//! The X11 system: display connection, shared state and event pump.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use horizon_casement_core::logging::targets;
use horizon_casement_core::{CasementError, EventQueue, PlatformWindow, Result, WindowId, WindowSpec};

use super::atoms::Atoms;
use super::cursor::HiddenCursor;
use super::display::{DisplayServer, NativeEvent};
use super::protocol::WmClient;
use super::window::X11Window;
use crate::config::ShellConfig;
use crate::registry::WindowRegistry;

/// State shared by every window of one display connection.
pub struct X11Context {
    pub(crate) display: Rc<dyn DisplayServer>,
    pub(crate) atoms: Atoms,
    pub(crate) hidden_cursor: HiddenCursor,
    pub(crate) config: ShellConfig,
    pub(crate) queue: Rc<dyn EventQueue>,
}

impl X11Context {
    pub(crate) fn new(display: Rc<dyn DisplayServer>, config: ShellConfig, queue: Rc<dyn EventQueue>) -> Self {
        let atoms = Atoms::intern(&*display);
        Self {
            display,
            atoms,
            hidden_cursor: HiddenCursor::new(),
            config,
            queue,
        }
    }

    /// Window-manager protocol client for this connection.
    pub(crate) fn wm(&self) -> WmClient<'_> {
        WmClient::new(&*self.display, &self.atoms)
    }
}

/// Owner of the X11 display connection and every window created on it.
///
/// All methods must be called from the thread that owns the connection.
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use horizon_casement::{EventBuffer, ShellConfig, WindowSpec};
/// use horizon_casement::x11::X11System;
///
/// let events = Rc::new(EventBuffer::new());
/// let system = X11System::connect(ShellConfig::default(), events.clone())?;
/// let id = system.create_window(&WindowSpec::new("Hello"))?;
///
/// loop {
///     system.wait_and_dispatch()?;
///     for event in events.drain() {
///         // ...
///     }
/// }
/// ```
pub struct X11System {
    ctx: Rc<X11Context>,
    windows: WindowRegistry<X11Window>,
}

impl X11System {
    /// Connect to the X server named by the configuration (or `$DISPLAY`).
    ///
    /// # Errors
    ///
    /// Returns [`CasementError::Connection`] if the server is unreachable.
    #[cfg(target_os = "linux")]
    pub fn connect(config: ShellConfig, queue: Rc<dyn EventQueue>) -> Result<Self> {
        let connection = super::connection::X11Connection::connect(config.display_name())?;
        tracing::info!(target: targets::DISPLAY, screen = connection.default_screen(), "connected to X server");
        Ok(Self::with_display(Rc::new(connection), config, queue))
    }

    /// Build the system on top of any display server implementation.
    pub fn with_display(display: Rc<dyn DisplayServer>, config: ShellConfig, queue: Rc<dyn EventQueue>) -> Self {
        Self {
            ctx: Rc::new(X11Context::new(display, config, queue)),
            windows: WindowRegistry::new(),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.ctx.config
    }

    pub fn display(&self) -> &dyn DisplayServer {
        &*self.ctx.display
    }

    /// Create a window and register it.
    ///
    /// # Errors
    ///
    /// Returns [`CasementError::WindowCreation`] if the native window
    /// cannot be created, or [`CasementError::DuplicateWindow`] if the
    /// server handed out an identifier that is still registered.
    pub fn create_window(&self, spec: &WindowSpec) -> Result<WindowId> {
        if let Some(parent) = spec.parent() {
            if !self.windows.contains(parent) {
                warn!(target: targets::WINDOW, %parent, "parent window is not managed by this system");
            }
        }
        let window = X11Window::create(Rc::clone(&self.ctx), spec)?;
        let id = window.id();
        self.windows.register(id, window)?;
        Ok(id)
    }

    /// Unregister and destroy a window.
    ///
    /// # Errors
    ///
    /// Returns [`CasementError::UnknownWindow`] if no such window exists.
    pub fn destroy_window(&self, id: WindowId) -> Result<()> {
        let mut window = self
            .windows
            .unregister(id)
            .ok_or(CasementError::UnknownWindow(id))?;
        window.destroy();
        Ok(())
    }

    /// Run a closure with mutable access to a window.
    pub fn with_window<F, R>(&self, id: WindowId, f: F) -> Option<R>
    where
        F: FnOnce(&mut X11Window) -> R,
    {
        self.windows.with_window_mut(id, f)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.ids()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Route a native event to the window it belongs to.
    ///
    /// Returns `false` if the event is for a window this system does not
    /// manage (e.g. one destroyed with events still in flight).
    pub fn dispatch(&self, event: &NativeEvent) -> bool {
        let id = WindowId::from_raw(u64::from(event.window()));
        let handled = self
            .windows
            .with_window_mut(id, |window| window.process_event(event))
            .is_some();
        if !handled {
            trace!(target: targets::EVENTS, %id, "event for unknown window dropped");
        }
        handled
    }

    /// Dispatch every queued native event without blocking. Returns the
    /// number of events read.
    pub fn pump_events(&self) -> Result<usize> {
        let mut count = 0;
        while let Some(event) = self.ctx.display.poll_event()? {
            self.dispatch(&event);
            count += 1;
        }
        self.ctx.display.flush()?;
        Ok(count)
    }

    /// Block until one native event arrives and dispatch it.
    pub fn wait_and_dispatch(&self) -> Result<()> {
        let event = self.ctx.display.wait_event()?;
        self.dispatch(&event);
        self.ctx.display.flush()?;
        Ok(())
    }
}

impl Drop for X11System {
    fn drop(&mut self) {
        for (_, mut window) in self.windows.drain() {
            window.destroy();
        }
        self.ctx.hidden_cursor.release(&*self.ctx.display);
        if let Err(err) = self.ctx.display.flush() {
            debug!(target: targets::DISPLAY, %err, "flush on shutdown failed");
        }
    }
}

impl std::fmt::Debug for X11System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11System")
            .field("windows", &self.windows)
            .field("config", &self.ctx.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use horizon_casement_core::{EventBuffer, EventKind, NativeCursor, Point, Rect};

    use super::super::display::{ButtonEvent, ClientMessage, CrossingEvent, CrossingMode};
    use super::super::testing::FakeDisplay;
    use super::*;

    fn system() -> (X11System, Rc<FakeDisplay>, Rc<EventBuffer>) {
        let display = Rc::new(FakeDisplay::new());
        let events = Rc::new(EventBuffer::new());
        let system = X11System::with_display(display.clone(), ShellConfig::default(), events.clone());
        (system, display, events)
    }

    fn xid(id: WindowId) -> u32 {
        id.raw() as u32
    }

    #[test]
    fn test_create_and_destroy() {
        let (system, display, _) = system();
        let id = system.create_window(&WindowSpec::new("Main")).unwrap();

        assert_eq!(system.window_ids(), vec![id]);
        assert!(display.window_exists(xid(id)));

        system.destroy_window(id).unwrap();
        assert_eq!(system.window_count(), 0);
        assert!(!display.window_exists(xid(id)));
        assert!(matches!(system.destroy_window(id), Err(CasementError::UnknownWindow(_))));
    }

    #[test]
    fn test_dispatch_routes_by_native_id() {
        let (system, _, events) = system();
        let first = system.create_window(&WindowSpec::default()).unwrap();
        let second = system.create_window(&WindowSpec::default()).unwrap();

        let button = NativeEvent::Button(ButtonEvent {
            window: xid(second),
            pressed: true,
            button: 3,
            position: Point::new(1, 1),
            state: 0,
            time: 0,
        });
        assert!(system.dispatch(&button));

        let ev = events.pop().unwrap();
        assert_eq!(ev.window, Some(second));
        assert_ne!(ev.window, Some(first));
    }

    #[test]
    fn test_dispatch_unknown_window_is_dropped() {
        let (system, _, events) = system();
        assert!(!system.dispatch(&NativeEvent::Map { window: 0xdead }));
        assert!(events.is_empty());
    }

    #[test]
    fn test_pump_drains_queue() {
        let (system, display, events) = system();
        let id = system.create_window(&WindowSpec::default()).unwrap();
        let delete = display.atom("WM_DELETE_WINDOW");

        display.push_event(NativeEvent::Crossing(CrossingEvent {
            window: xid(id),
            entered: true,
            mode: CrossingMode::Normal,
            position: Point::ZERO,
            state: 0,
        }));
        display.push_event(NativeEvent::ClientMessage(ClientMessage {
            window: xid(id),
            message_type: display.atom("WM_PROTOCOLS"),
            data: [delete, 0, 0, 0, 0],
        }));

        assert_eq!(system.pump_events().unwrap(), 2);
        let kinds: Vec<_> = events.drain().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::MouseEnter, EventKind::CloseWindow]);
        // Closing is the caller's decision.
        assert_eq!(system.window_count(), 1);
    }

    #[test]
    fn test_wait_and_dispatch_reports_connection_loss() {
        let (system, _, _) = system();
        assert!(matches!(system.wait_and_dispatch(), Err(CasementError::Connection(_))));
    }

    #[test]
    fn test_with_window() {
        let (system, _, _) = system();
        let id = system.create_window(&WindowSpec::new("Before")).unwrap();

        system.with_window(id, |window| window.set_title("After"));
        assert_eq!(system.with_window(id, |window| window.title()), Some("After".to_string()));
        assert_eq!(system.with_window(WindowId::from_raw(1), |window| window.title()), None);
    }

    #[test]
    fn test_creation_failure_registers_nothing() {
        let mut display = FakeDisplay::new();
        display.refuse_windows = true;
        let system = X11System::with_display(Rc::new(display), ShellConfig::default(), Rc::new(EventBuffer::new()));

        assert!(matches!(
            system.create_window(&WindowSpec::default()),
            Err(CasementError::WindowCreation(_))
        ));
        assert_eq!(system.window_count(), 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let display = Rc::new(FakeDisplay::new());
        {
            let system = X11System::with_display(display.clone(), ShellConfig::default(), Rc::new(EventBuffer::new()));
            let a = system.create_window(&WindowSpec::new("").with_content_rect(Rect::new(0, 0, 50, 50))).unwrap();
            let b = system.create_window(&WindowSpec::default()).unwrap();
            system.with_window(a, |w| w.set_native_mouse_cursor(NativeCursor::Hidden));
            system.with_window(b, |w| w.set_native_mouse_cursor(NativeCursor::Hidden));
            assert_eq!(display.live_cursor_count(), 1);
        }
        let state = display.state.borrow();
        assert!(state.windows.is_empty());
        assert!(state.live_cursors.is_empty());
    }
}
