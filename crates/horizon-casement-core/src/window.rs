//! The abstract window contract implemented by every platform backend.
//!
//! Application code talks to windows only through [`PlatformWindow`]; the
//! concrete backend is chosen once at process start.

use crate::cursor::{NativeCursor, WindowAction};
use crate::event::{Event, WindowId};
use crate::geometry::{Point, Rect, Size};
use crate::surface::Surface;

/// Descriptor of the screen a window lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenInfo {
    /// Platform screen number.
    pub number: usize,
    /// Full screen bounds in device pixels.
    pub bounds: Rect,
}

/// Handle to the color space a window is displayed in.
///
/// Color management beyond obtaining this handle is left to the drawing
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// The sRGB color space.
    #[default]
    Srgb,
}

/// The public contract of a native window.
///
/// Geometry is reported in device pixels except where a method says
/// otherwise. State queries degrade to conservative defaults (`false`, zero
/// insets, empty strings) when the platform cannot answer them.
pub trait PlatformWindow {
    /// Identifier of the native window.
    fn id(&self) -> WindowId;

    /// Raw native handle (an XID on X11).
    fn native_handle(&self) -> u64 {
        self.id().raw()
    }

    /// Current client area size.
    fn client_size(&self) -> Size;

    /// Client size the window returns to when leaving maximized or
    /// fullscreen state.
    fn restored_size(&self) -> Size;

    /// Outer rectangle, always the content rect enlarged by the currently
    /// known decoration insets.
    fn frame(&self) -> Rect;

    /// Client area in screen coordinates.
    fn content_rect(&self) -> Rect;

    /// Ask the window manager to raise and focus the window.
    fn activate(&mut self);

    /// Toggle the maximized state.
    fn maximize(&mut self);

    fn minimize(&mut self);

    fn is_maximized(&self) -> bool;

    fn is_minimized(&self) -> bool;

    fn is_fullscreen(&self) -> bool;

    fn set_fullscreen(&mut self, state: bool);

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);

    /// Set window icons, smallest to largest.
    fn set_icons(&mut self, icons: &[&dyn Surface]);

    /// Logical-to-device pixel ratio, always at least 1.
    fn scale(&self) -> i32;

    /// Change the scale and queue a resize event for the current client
    /// size re-expressed at the new scale.
    fn set_scale(&mut self, scale: i32);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Route all pointer events to this window.
    fn capture_mouse(&mut self);

    fn release_mouse(&mut self);

    /// Move the pointer to a logical position inside the client area.
    fn set_mouse_position(&mut self, position: Point);

    /// Install a named system cursor. Returns `false` if the cursor could
    /// not be created.
    fn set_native_mouse_cursor(&mut self, cursor: NativeCursor) -> bool;

    /// Install a cursor built from a bitmap. `focus` is the hot spot in
    /// surface pixels and `scale` replicates each pixel into a
    /// `scale x scale` block. Returns `false` if the platform cannot show
    /// bitmap cursors or the surface format is unsupported.
    fn set_custom_mouse_cursor(&mut self, surface: &dyn Surface, focus: Point, scale: i32) -> bool;

    /// Start an interactive move/resize from the given pointer event.
    fn perform_window_action(&mut self, action: WindowAction, event: Option<&Event>);

    /// Queue a repaint of a logical rectangle.
    fn invalidate_region(&mut self, rect: Rect);

    fn screen(&self) -> ScreenInfo;

    fn color_space(&self) -> ColorSpace {
        ColorSpace::Srgb
    }
}
