//! The X11 native window.

use std::num::NonZeroU32;
use std::rc::Rc;

use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
    WindowHandle, XcbDisplayHandle, XcbWindowHandle,
};
use tracing::{debug, trace, warn};

use horizon_casement_core::logging::targets;
use horizon_casement_core::{
    Border, CasementError, Event, MouseButton, NativeCursor, PlatformWindow, Point, Rect, Result, ScreenInfo,
    Size, Surface, WindowAction, WindowId, WindowSpec,
};

use super::cursor::WindowCursor;
use super::display::{DisplayResult, GcHandle, InputContextId, NativeEvent, Xid};
use super::system::X11Context;
use super::translator::{EventTranslator, TranslateContext};

/// A top-level X11 window.
///
/// Created and owned by [`X11System`](super::X11System); native events for
/// it are routed to [`X11Window::process_event`].
pub struct X11Window {
    ctx: Rc<X11Context>,
    xid: Xid,
    gc: Option<GcHandle>,
    input_context: Option<InputContextId>,
    cursor: WindowCursor,
    translator: EventTranslator,

    /// Logical-to-device pixel ratio, at least 1.
    scale: i32,
    /// Decoration insets last published by the window manager.
    insets: Border,
    restored_size: Size,

    borderless: bool,
    floating: bool,
    parent: Option<WindowId>,
    visible: bool,
    /// Last requested fullscreen state (no live query).
    fullscreen: bool,
    /// Set by `minimize()`, cleared when the window is mapped again.
    minimized: bool,
    /// Created from an outer frame rect: the first configure shrinks the
    /// window by the decoration insets.
    initializing_from_frame: bool,
    destroyed: bool,
}

impl X11Window {
    /// Create and configure the native window.
    ///
    /// # Errors
    ///
    /// Returns [`CasementError::WindowCreation`] if the server refuses to
    /// create the window or its graphics context. Nothing is left behind
    /// on failure.
    pub(crate) fn create(ctx: Rc<X11Context>, spec: &WindowSpec) -> Result<Self> {
        let display = &*ctx.display;
        let (rect, from_frame) = spec.initial_rect();

        let xid = display
            .create_window(rect)
            .map_err(|err| CasementError::WindowCreation(err.to_string()))?;

        let wm = ctx.wm();
        wm.set_class_hint(xid, &ctx.config.instance_name(), ctx.config.class_name());
        if spec.floating() {
            wm.set_floating_type(xid);
        }
        if spec.borderless() {
            wm.set_borderless(xid);
        }
        wm.set_normal_hints(xid, rect, ctx.config.resize_increment());
        if !spec.title().is_empty() {
            wm.set_title(xid, spec.title());
        }
        wm.set_protocols(xid);
        if let (true, Some(parent)) = (spec.floating(), spec.parent()) {
            wm.set_transient_for(xid, parent.raw() as Xid);
        }

        let gc = match display.create_gc(xid) {
            Ok(gc) => gc,
            Err(err) => {
                if let Err(destroy_err) = display.destroy_window(xid) {
                    debug!(target: targets::WINDOW, %destroy_err, "cleanup after failed creation");
                }
                return Err(CasementError::WindowCreation(format!("cannot create graphics context: {err}")));
            }
        };
        let input_context = display.create_input_context(xid);
        if input_context.is_none() {
            trace!(target: targets::WINDOW, window = xid, "no input method context");
        }
        if display.select_stylus_events(xid) {
            trace!(target: targets::WINDOW, window = xid, "tablet events selected");
        }

        if spec.visible() {
            report(xid, "map window", display.map_window(xid));
        }
        report(xid, "flush", display.flush());

        debug!(
            target: targets::WINDOW,
            window = xid,
            ?rect,
            from_frame,
            borderless = spec.borderless(),
            floating = spec.floating(),
            "window created"
        );

        let translator = EventTranslator::new(ctx.config.double_click_timeout());
        Ok(Self {
            ctx,
            xid,
            gc: Some(gc),
            input_context,
            cursor: WindowCursor::new(),
            translator,
            scale: spec.scale(),
            insets: Border::ZERO,
            restored_size: if from_frame { Size::ZERO } else { rect.size() },
            borderless: spec.borderless(),
            floating: spec.floating(),
            parent: spec.parent(),
            visible: spec.visible(),
            fullscreen: false,
            minimized: false,
            initializing_from_frame: from_frame,
            destroyed: false,
        })
    }

    /// Native window XID.
    pub fn xid(&self) -> Xid {
        self.xid
    }

    /// Decoration insets currently known.
    pub fn insets(&self) -> Border {
        self.insets
    }

    pub fn is_borderless(&self) -> bool {
        self.borderless
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    /// Parent window of a floating window.
    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    // =========================================================================
    // Event processing
    // =========================================================================

    /// Handle a native event addressed to this window, queueing whatever
    /// canonical event it produces.
    pub fn process_event(&mut self, event: &NativeEvent) {
        match *event {
            NativeEvent::Configure { rect, .. } if self.initializing_from_frame => {
                self.finish_frame_initialization(rect);
                return;
            }
            NativeEvent::Property { atom, .. } => {
                if self.ctx.wm().is_frame_extents(atom) {
                    self.update_frame_extents();
                }
                return;
            }
            NativeEvent::Map { .. } => {
                trace!(target: targets::WINDOW, window = self.xid, "mapped");
                self.minimized = false;
                return;
            }
            _ => {}
        }

        let ctx = TranslateContext {
            display: &*self.ctx.display,
            atoms: &self.ctx.atoms,
            input_context: self.input_context,
            scale: self.scale,
        };
        let Some(translated) = self.translator.translate(&ctx, event) else {
            return;
        };

        if let NativeEvent::Configure { rect, .. } = *event {
            if !self.fullscreen && !self.ctx.wm().is_maximized(self.xid) {
                self.restored_size = rect.size();
            }
        }
        self.queue_event(translated);
    }

    /// The window was created with its outer frame rect; now that the
    /// decorations are known, shrink it so the frame matches the request.
    fn finish_frame_initialization(&mut self, rect: Rect) {
        self.initializing_from_frame = false;

        // One resize increment is added back: the window manager rounds
        // the height down to the increment.
        let size = Size::new(
            rect.width - self.insets.width(),
            rect.height - self.insets.height() + self.ctx.config.resize_increment(),
        );
        debug!(target: targets::WINDOW, window = self.xid, ?size, insets = ?self.insets, "fit frame");
        self.restored_size = size;
        report(self.xid, "resize window", self.ctx.display.resize_window(self.xid, size));
    }

    fn update_frame_extents(&mut self) {
        let wm = self.ctx.wm();
        if self.borderless {
            wm.clear_frame_extents(self.xid);
        }
        if let Some(insets) = wm.frame_extents(self.xid) {
            trace!(target: targets::WINDOW, window = self.xid, ?insets, "frame extents");
            self.insets = insets;
        }
    }

    fn queue_event(&self, event: Event) {
        self.ctx.queue.queue_event(event.with_window(self.id()));
    }

    fn geometry(&self) -> Option<Rect> {
        match self.ctx.display.geometry(self.xid) {
            Ok(rect) => Some(rect),
            Err(err) => {
                warn!(target: targets::WINDOW, window = self.xid, %err, "cannot query geometry");
                None
            }
        }
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Release every native resource: cursor, input context and graphics
    /// context first, then the window itself. Safe to call twice.
    pub(crate) fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        let display = &*self.ctx.display;
        self.cursor.release(display, &self.ctx.hidden_cursor);
        if let Some(ic) = self.input_context.take() {
            display.destroy_input_context(ic);
        }
        if let Some(gc) = self.gc.take() {
            report(self.xid, "free graphics context", display.free_gc(gc));
        }
        report(self.xid, "destroy window", display.destroy_window(self.xid));
        report(self.xid, "flush", display.flush());
        debug!(target: targets::WINDOW, window = self.xid, "window destroyed");
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for X11Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11Window")
            .field("xid", &self.xid)
            .field("scale", &self.scale)
            .field("insets", &self.insets)
            .field("borderless", &self.borderless)
            .field("floating", &self.floating)
            .field("visible", &self.visible)
            .field("fullscreen", &self.fullscreen)
            .finish_non_exhaustive()
    }
}

fn report(window: Xid, what: &str, result: DisplayResult<()>) {
    if let Err(err) = result {
        warn!(target: targets::WINDOW, window, %err, "{what} failed");
    }
}

impl PlatformWindow for X11Window {
    fn id(&self) -> WindowId {
        WindowId::from_raw(u64::from(self.xid))
    }

    fn client_size(&self) -> Size {
        self.geometry()
            .map(|rect| rect.size())
            .unwrap_or_else(|| self.translator.last_client_size())
    }

    fn restored_size(&self) -> Size {
        if self.restored_size.is_empty() {
            self.client_size()
        } else {
            self.restored_size
        }
    }

    fn frame(&self) -> Rect {
        self.content_rect().enlarged(self.insets)
    }

    fn content_rect(&self) -> Rect {
        let Some(rect) = self.geometry() else {
            return Rect::from_origin_size(Point::ZERO, self.translator.last_client_size());
        };
        let root = self.ctx.display.root_window();
        let origin = match self.ctx.display.translate_coordinates(self.xid, root, Point::ZERO) {
            Ok(origin) => origin,
            Err(err) => {
                debug!(target: targets::WINDOW, window = self.xid, %err, "cannot translate to root");
                rect.origin()
            }
        };
        Rect::from_origin_size(origin, rect.size())
    }

    fn activate(&mut self) {
        self.ctx.wm().activate(self.xid);
    }

    fn maximize(&mut self) {
        self.ctx.wm().toggle_maximized(self.xid);
    }

    fn minimize(&mut self) {
        self.ctx.wm().iconify(self.xid);
        self.minimized = true;
    }

    fn is_maximized(&self) -> bool {
        self.ctx.wm().is_maximized(self.xid)
    }

    fn is_minimized(&self) -> bool {
        self.minimized
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, state: bool) {
        if self.fullscreen == state {
            return;
        }
        if self.ctx.wm().request_fullscreen(self.xid, state) {
            self.fullscreen = state;
        }
    }

    fn title(&self) -> String {
        self.ctx.wm().title(self.xid)
    }

    fn set_title(&mut self, title: &str) {
        self.ctx.wm().set_title(self.xid, title);
    }

    fn set_icons(&mut self, icons: &[&dyn Surface]) {
        self.ctx.wm().set_icons(self.xid, icons);
    }

    fn scale(&self) -> i32 {
        self.scale
    }

    fn set_scale(&mut self, scale: i32) {
        self.scale = scale.max(1);
        let size = self.client_size().to_logical(self.scale);
        self.queue_event(Event::resize(size));
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        let display = &*self.ctx.display;
        let result = if visible {
            display.map_window(self.xid)
        } else {
            display.unmap_window(self.xid)
        };
        report(self.xid, "change visibility", result);
        self.visible = visible;
    }

    fn capture_mouse(&mut self) {
        report(self.xid, "grab pointer", self.ctx.display.grab_pointer(self.xid));
    }

    fn release_mouse(&mut self) {
        report(self.xid, "ungrab pointer", self.ctx.display.ungrab_pointer());
    }

    fn set_mouse_position(&mut self, position: Point) {
        let device = position.to_device(self.scale);
        report(self.xid, "warp pointer", self.ctx.display.warp_pointer(self.xid, device));
    }

    fn set_native_mouse_cursor(&mut self, cursor: NativeCursor) -> bool {
        self.cursor
            .set_native(&*self.ctx.display, &self.ctx.hidden_cursor, self.xid, cursor)
    }

    fn set_custom_mouse_cursor(&mut self, surface: &dyn Surface, focus: Point, scale: i32) -> bool {
        self.cursor.set_custom(
            &*self.ctx.display,
            &self.ctx.hidden_cursor,
            self.xid,
            surface,
            focus,
            scale,
        )
    }

    fn perform_window_action(&mut self, action: WindowAction, event: Option<&Event>) {
        let (position, button) = event.map_or((Point::ZERO, MouseButton::None), |ev| (ev.position, ev.button));
        let device = position.to_device(self.scale);
        let root = self.ctx.display.root_window();
        let root_position = match self.ctx.display.translate_coordinates(self.xid, root, device) {
            Ok(point) => point,
            Err(err) => {
                warn!(target: targets::WINDOW, window = self.xid, %err, "cannot translate pointer position");
                device
            }
        };
        self.ctx.wm().begin_move_resize(self.xid, root_position, action, button);
    }

    fn invalidate_region(&mut self, rect: Rect) {
        self.queue_event(Event::paint(rect.to_device(self.scale)));
    }

    fn screen(&self) -> ScreenInfo {
        ScreenInfo {
            number: self.ctx.display.default_screen(),
            bounds: Rect::from_origin_size(Point::ZERO, self.ctx.display.screen_size()),
        }
    }
}

impl HasWindowHandle for X11Window {
    fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
        let xid = NonZeroU32::new(self.xid).ok_or(HandleError::Unavailable)?;
        let raw = RawWindowHandle::Xcb(XcbWindowHandle::new(xid));
        // SAFETY: the XID stays valid while `self` is borrowed; destroying
        // the window requires ownership.
        Ok(unsafe { WindowHandle::borrow_raw(raw) })
    }
}

impl HasDisplayHandle for X11Window {
    fn display_handle(&self) -> std::result::Result<DisplayHandle<'_>, HandleError> {
        let screen = self.ctx.display.default_screen() as i32;
        let raw = RawDisplayHandle::Xcb(XcbDisplayHandle::new(None, screen));
        // SAFETY: no connection pointer is exposed, only the screen number.
        Ok(unsafe { DisplayHandle::borrow_raw(raw) })
    }
}
