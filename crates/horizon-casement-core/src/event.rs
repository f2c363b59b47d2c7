//! The canonical event model.
//!
//! Every backend normalizes its native event stream into [`Event`] values
//! and hands them to an [`EventQueue`]. The queue is the only thing the
//! rest of the application sees; it never deals with native events.
//!
//! # Example
//!
//! ```
//! use horizon_casement_core::{Event, EventBuffer, EventKind, EventQueue, MouseButton, Point};
//!
//! let queue = EventBuffer::new();
//! queue.queue_event(Event::mouse(EventKind::MouseDown, Point::new(10, 20)).with_button(MouseButton::Left));
//!
//! let event = queue.pop().unwrap();
//! assert_eq!(event.kind, EventKind::MouseDown);
//! assert_eq!(event.button, MouseButton::Left);
//! ```

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::geometry::{Point, Rect, Size};
use crate::keys::{KeyModifiers, KeyScancode};

/// Unique identifier for a native window.
///
/// Wraps the backend's native handle (an XID on X11) widened to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Create from a raw native handle value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw native handle value.
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Discriminates the kind of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseEnter,
    MouseLeave,
    MouseWheel,
    MouseDoubleClick,
    /// The window manager asked to close the window.
    CloseWindow,
    /// The client area changed size; `size` holds the logical size.
    Resize,
    /// A region must be repainted; `rect` holds it in device pixels.
    PaintInvalidate,
}

impl EventKind {
    /// Check if this is a pointer event carrying a position.
    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            EventKind::MouseDown
                | EventKind::MouseUp
                | EventKind::MouseMove
                | EventKind::MouseEnter
                | EventKind::MouseLeave
                | EventKind::MouseWheel
                | EventKind::MouseDoubleClick
        )
    }

    /// Check if this is a keyboard event.
    pub fn is_key(&self) -> bool {
        matches!(self, EventKind::KeyDown | EventKind::KeyUp)
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// No button (motion, wheel, crossing events).
    #[default]
    None,
    /// Primary button (usually left).
    Left,
    /// Middle button (scroll wheel click).
    Middle,
    /// Secondary button (usually right).
    Right,
    /// Additional button 1 (e.g., browser back).
    X1,
    /// Additional button 2 (e.g., browser forward).
    X2,
}

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerType {
    /// Core pointer events, which do not say which device moved.
    #[default]
    Unknown,
    /// Tablet pen tip or barrel buttons.
    Pen,
    /// Tablet eraser end.
    Eraser,
}

/// A canonical window event.
///
/// Only the fields relevant to `kind` are meaningful; the rest keep their
/// default values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Window the event belongs to, filled in by the backend when queued.
    pub window: Option<WindowId>,
    /// Pointer position in logical pixels, relative to the client area.
    pub position: Point,
    /// Modifiers held when the event was generated.
    pub modifiers: KeyModifiers,
    /// Button for press/release/double-click events.
    pub button: MouseButton,
    /// Wheel movement: `y` is vertical, `x` horizontal, in notches.
    pub wheel_delta: Point,
    /// Device behind a pointer event.
    pub pointer_type: PointerType,
    /// Tablet pressure in `0.0..=1.0`.
    pub pressure: f32,
    /// Physical key for key events.
    pub scancode: KeyScancode,
    /// Composed character for key-down events, if any.
    pub unicode_char: Option<char>,
    /// Number of auto-repeat presses folded into this key event.
    pub repeat: u32,
    /// New logical client size for resize events.
    pub size: Size,
    /// Dirty rectangle for paint events.
    pub rect: Rect,
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::MouseMove
    }
}

impl Event {
    /// Create an event of the given kind with default payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Create a pointer event at a logical position.
    pub fn mouse(kind: EventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            ..Default::default()
        }
    }

    /// Create a key event.
    pub fn key(kind: EventKind, scancode: KeyScancode) -> Self {
        Self {
            kind,
            scancode,
            ..Default::default()
        }
    }

    /// Create a resize event for a logical client size.
    pub fn resize(size: Size) -> Self {
        Self {
            kind: EventKind::Resize,
            size,
            ..Default::default()
        }
    }

    /// Create a paint-invalidate event for a device-pixel rectangle.
    pub fn paint(rect: Rect) -> Self {
        Self {
            kind: EventKind::PaintInvalidate,
            rect,
            ..Default::default()
        }
    }

    /// Set the owning window.
    pub fn with_window(mut self, window: WindowId) -> Self {
        self.window = Some(window);
        self
    }

    /// Set the modifier set.
    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the mouse button.
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Set the wheel delta.
    pub fn with_wheel_delta(mut self, delta: Point) -> Self {
        self.wheel_delta = delta;
        self
    }

    /// Set the pointing device and its pressure.
    pub fn with_pointer(mut self, pointer_type: PointerType, pressure: f32) -> Self {
        self.pointer_type = pointer_type;
        self.pressure = pressure;
        self
    }

    /// Set the composed character.
    pub fn with_unicode_char(mut self, ch: Option<char>) -> Self {
        self.unicode_char = ch;
        self
    }
}

/// Sink accepting canonical events produced by a backend.
///
/// The dispatch loop that consumes the events is outside of this crate.
pub trait EventQueue {
    /// Append an event to the queue.
    fn queue_event(&self, event: Event);
}

/// A simple FIFO event queue.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Mutex<VecDeque<Event>>,
}

impl EventBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest event.
    pub fn pop(&self) -> Option<Event> {
        self.events.lock().pop_front()
    }

    /// Remove and return every queued event, oldest first.
    pub fn drain(&self) -> Vec<Event> {
        self.events.lock().drain(..).collect()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check if there are no queued events.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventQueue for EventBuffer {
    fn queue_event(&self, event: Event) {
        self.events.lock().push_back(event);
    }
}

/// An event queue backed by a channel.
///
/// Lets the consumer live on a different thread than the one pumping native
/// events.
#[derive(Debug, Clone)]
pub struct ChannelEventQueue {
    sender: Sender<Event>,
}

impl ChannelEventQueue {
    /// Create an unbounded queue and the receiving end for the consumer.
    pub fn unbounded() -> (Self, Receiver<Event>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl EventQueue for ChannelEventQueue {
    fn queue_event(&self, event: Event) {
        if self.sender.send(event).is_err() {
            tracing::debug!(
                target: crate::logging::targets::EVENTS,
                "event receiver dropped, discarding event"
            );
        }
    }
}
