//! Window construction spec and builder.

use crate::event::WindowId;
use crate::geometry::Rect;

/// Configuration for creating a native window.
///
/// A window is placed either by its outer `frame` (including decorations)
/// or by its `content_rect` (client area only). When a non-empty frame is
/// given it takes precedence.
///
/// # Example
///
/// ```
/// use horizon_casement_core::{Rect, WindowSpec};
///
/// let spec = WindowSpec::new("Palette")
///     .with_content_rect(Rect::new(100, 100, 240, 480))
///     .with_scale(2)
///     .with_floating(true);
///
/// assert_eq!(spec.scale(), 2);
/// assert!(spec.floating());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    /// Window title.
    title: String,
    /// Outer rectangle including decorations, in device pixels.
    frame: Rect,
    /// Client rectangle, in device pixels.
    content_rect: Rect,
    /// Logical-to-device pixel ratio.
    scale: i32,
    /// Whether the window has no WM decorations.
    borderless: bool,
    /// Whether the window is a floating utility window.
    floating: bool,
    /// Parent for floating windows (non-owning).
    parent: Option<WindowId>,
    /// Whether the window is shown on creation.
    visible: bool,
    /// Whether the window may be resized by the user.
    resizable: bool,
    /// Whether the window offers a minimize button.
    minimizable: bool,
    /// Whether the window offers a maximize button.
    maximizable: bool,
}

impl WindowSpec {
    /// Default client size in device pixels.
    pub const DEFAULT_CONTENT_RECT: Rect = Rect::new(0, 0, 640, 480);

    /// Create a new window spec with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            frame: Rect::ZERO,
            content_rect: Self::DEFAULT_CONTENT_RECT,
            scale: 1,
            borderless: false,
            floating: false,
            parent: None,
            visible: true,
            resizable: true,
            minimizable: true,
            maximizable: true,
        }
    }

    /// Place the window by its outer frame.
    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self
    }

    /// Place the window by its client area.
    pub fn with_content_rect(mut self, rect: Rect) -> Self {
        self.content_rect = rect;
        self
    }

    /// Set the scale factor. Values below 1 are clamped to 1.
    pub fn with_scale(mut self, scale: i32) -> Self {
        self.scale = scale.max(1);
        self
    }

    /// Remove the WM decorations.
    pub fn with_borderless(mut self, borderless: bool) -> Self {
        self.borderless = borderless;
        self
    }

    /// Make the window a floating utility window.
    pub fn with_floating(mut self, floating: bool) -> Self {
        self.floating = floating;
        self
    }

    /// Set the parent window of a floating window.
    pub fn with_parent(mut self, parent: WindowId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set whether the window is shown right after creation.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set whether the window is resizable.
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Set whether the window can be minimized.
    pub fn with_minimizable(mut self, minimizable: bool) -> Self {
        self.minimizable = minimizable;
        self
    }

    /// Set whether the window can be maximized.
    pub fn with_maximizable(mut self, maximizable: bool) -> Self {
        self.maximizable = maximizable;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn content_rect(&self) -> Rect {
        self.content_rect
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn borderless(&self) -> bool {
        self.borderless
    }

    pub fn floating(&self) -> bool {
        self.floating
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn resizable(&self) -> bool {
        self.resizable
    }

    pub fn minimizable(&self) -> bool {
        self.minimizable
    }

    pub fn maximizable(&self) -> bool {
        self.maximizable
    }

    /// The rectangle used to create the native window and whether it
    /// describes the outer frame (`true`) or the client area (`false`).
    pub fn initial_rect(&self) -> (Rect, bool) {
        if self.frame.is_empty() {
            (self.content_rect, false)
        } else {
            (self.frame, true)
        }
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self::new("")
    }
}
