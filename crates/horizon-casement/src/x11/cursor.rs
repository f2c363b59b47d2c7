//! Native cursor synthesis.
//!
//! Each window owns at most one live cursor. Installing a new one frees the
//! previous resource, except the hidden cursor, which is a singleton shared
//! by every window of the connection.

use std::cell::Cell;

use tracing::{debug, trace, warn};

use horizon_casement_core::logging::targets;
use horizon_casement_core::{NativeCursor, Point, Surface};

use super::display::{CursorHandle, CursorImage, DisplayServer, Xid};

/// Glyph indices in the standard cursor font.
mod glyph {
    pub const X_CURSOR: u16 = 0;
    pub const ARROW: u16 = 2;
    pub const BOTTOM_LEFT_CORNER: u16 = 12;
    pub const BOTTOM_RIGHT_CORNER: u16 = 14;
    pub const BOTTOM_SIDE: u16 = 16;
    pub const CROSSHAIR: u16 = 34;
    pub const FLEUR: u16 = 52;
    pub const HAND1: u16 = 58;
    pub const LEFT_SIDE: u16 = 70;
    pub const QUESTION_ARROW: u16 = 92;
    pub const RIGHT_SIDE: u16 = 96;
    pub const SB_H_DOUBLE_ARROW: u16 = 108;
    pub const SB_V_DOUBLE_ARROW: u16 = 116;
    pub const TOP_LEFT_CORNER: u16 = 134;
    pub const TOP_RIGHT_CORNER: u16 = 136;
    pub const TOP_SIDE: u16 = 138;
    pub const WATCH: u16 = 150;
    pub const XTERM: u16 = 152;
}

/// Largest cursor side the protocol can describe.
const MAX_CURSOR_SIDE: u32 = u16::MAX as u32;

/// Cursor-font glyph for a symbolic cursor. `None` for [`NativeCursor::Hidden`].
pub fn font_shape(cursor: NativeCursor) -> Option<u16> {
    let shape = match cursor {
        NativeCursor::Hidden => return None,
        NativeCursor::Arrow => glyph::ARROW,
        NativeCursor::Crosshair => glyph::CROSSHAIR,
        NativeCursor::IBeam => glyph::XTERM,
        NativeCursor::Wait => glyph::WATCH,
        NativeCursor::Link => glyph::HAND1,
        NativeCursor::Help => glyph::QUESTION_ARROW,
        NativeCursor::Forbidden => glyph::X_CURSOR,
        NativeCursor::Move => glyph::FLEUR,
        NativeCursor::SizeN => glyph::TOP_SIDE,
        NativeCursor::SizeNS => glyph::SB_V_DOUBLE_ARROW,
        NativeCursor::SizeS => glyph::BOTTOM_SIDE,
        NativeCursor::SizeW => glyph::LEFT_SIDE,
        NativeCursor::SizeE => glyph::RIGHT_SIDE,
        NativeCursor::SizeWE => glyph::SB_H_DOUBLE_ARROW,
        NativeCursor::SizeNW => glyph::TOP_LEFT_CORNER,
        NativeCursor::SizeNE => glyph::TOP_RIGHT_CORNER,
        NativeCursor::SizeSW => glyph::BOTTOM_LEFT_CORNER,
        NativeCursor::SizeSE => glyph::BOTTOM_RIGHT_CORNER,
    };
    Some(shape)
}

/// Build a device-resolution ARGB cursor image from a surface.
///
/// Each source pixel is replicated into a `scale x scale` block and
/// re-packed as `0xAARRGGBB`. The hot spot lands in the middle of the
/// focus pixel's block. Returns `None` for surfaces that are not 32 bits
/// per pixel, and when the scaled image would not fit the 16-bit cursor
/// dimensions of the protocol.
pub fn build_cursor_image(surface: &dyn Surface, focus: Point, scale: i32) -> Option<CursorImage> {
    let format = surface.format();
    if format.bits_per_pixel != 32 {
        return None;
    }

    let scale = scale.max(1);
    let factor = scale as u32;
    let fits = |side: u32| side.checked_mul(factor).filter(|&scaled| scaled <= MAX_CURSOR_SIDE);
    let (Some(width), Some(height)) = (fits(surface.width()), fits(surface.height())) else {
        debug!(
            target: targets::CURSOR,
            width = surface.width(),
            height = surface.height(),
            scale,
            "scaled cursor too large"
        );
        return None;
    };

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        let row = surface.row(y / factor);
        pixels.extend((0..width).map(|x| format.to_argb(row[(x / factor) as usize])));
    }

    Some(CursorImage {
        width,
        height,
        hotspot: Point::new(
            scale.saturating_mul(focus.x).saturating_add(scale / 2),
            scale.saturating_mul(focus.y).saturating_add(scale / 2),
        ),
        pixels,
    })
}

/// The process-wide invisible cursor.
///
/// Created on first use and freed only when the display connection is torn
/// down.
#[derive(Debug, Default)]
pub struct HiddenCursor {
    handle: Cell<Option<CursorHandle>>,
}

impl HiddenCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The singleton handle, if it has been created.
    pub fn handle(&self) -> Option<CursorHandle> {
        self.handle.get()
    }

    /// Get the singleton, creating it with `window` as the drawable.
    pub fn get_or_create(&self, display: &dyn DisplayServer, window: Xid) -> Option<CursorHandle> {
        if let Some(handle) = self.handle.get() {
            return Some(handle);
        }
        match display.create_empty_cursor(window) {
            Ok(handle) => {
                debug!(target: targets::CURSOR, handle, "created hidden cursor");
                self.handle.set(Some(handle));
                Some(handle)
            }
            Err(err) => {
                warn!(target: targets::CURSOR, %err, "cannot create hidden cursor");
                None
            }
        }
    }

    /// Free the singleton. Only call once no window references it.
    pub fn release(&self, display: &dyn DisplayServer) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = display.free_cursor(handle) {
                debug!(target: targets::CURSOR, %err, "failed to free hidden cursor");
            }
        }
    }
}

/// The cursor currently installed on one window.
#[derive(Debug, Default)]
pub struct WindowCursor {
    current: Option<CursorHandle>,
}

impl WindowCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<CursorHandle> {
        self.current
    }

    /// Install a symbolic cursor.
    pub fn set_native(
        &mut self,
        display: &dyn DisplayServer,
        hidden: &HiddenCursor,
        window: Xid,
        cursor: NativeCursor,
    ) -> bool {
        let created = match font_shape(cursor) {
            None => hidden.get_or_create(display, window),
            Some(shape) => match display.create_font_cursor(shape) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    warn!(target: targets::CURSOR, ?cursor, %err, "cannot create font cursor");
                    None
                }
            },
        };
        trace!(target: targets::CURSOR, window, ?cursor, "set native cursor");
        self.install(display, hidden, window, created)
    }

    /// Install a cursor synthesized from a bitmap.
    pub fn set_custom(
        &mut self,
        display: &dyn DisplayServer,
        hidden: &HiddenCursor,
        window: Xid,
        surface: &dyn Surface,
        focus: Point,
        scale: i32,
    ) -> bool {
        if !display.supports_argb_cursors() {
            debug!(target: targets::CURSOR, "display lacks ARGB cursor support");
            return false;
        }
        let Some(image) = build_cursor_image(surface, focus, scale) else {
            debug!(
                target: targets::CURSOR,
                bpp = surface.format().bits_per_pixel,
                "cannot build cursor image"
            );
            return false;
        };
        let created = match display.create_argb_cursor(&image) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(target: targets::CURSOR, %err, "cannot create bitmap cursor");
                None
            }
        };
        self.install(display, hidden, window, created)
    }

    fn install(
        &mut self,
        display: &dyn DisplayServer,
        hidden: &HiddenCursor,
        window: Xid,
        cursor: Option<CursorHandle>,
    ) -> bool {
        let Some(cursor) = cursor else {
            return false;
        };
        self.release(display, hidden);
        if let Err(err) = display.define_cursor(window, cursor) {
            warn!(target: targets::CURSOR, window, %err, "cannot define cursor");
        }
        self.current = Some(cursor);
        true
    }

    /// Free the installed cursor unless it is the hidden singleton.
    pub fn release(&mut self, display: &dyn DisplayServer, hidden: &HiddenCursor) {
        let Some(previous) = self.current.take() else {
            return;
        };
        if hidden.handle() == Some(previous) {
            return;
        }
        if let Err(err) = display.free_cursor(previous) {
            debug!(target: targets::CURSOR, %err, "failed to free cursor");
        }
    }
}
