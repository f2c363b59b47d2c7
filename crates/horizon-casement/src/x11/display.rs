//! The display-server seam.
//!
//! [`DisplayServer`] lists the native X11 primitives the window shell
//! relies on. The shell never talks to the wire protocol directly: the
//! `x11rb` connection in [`super::connection`] implements this trait for
//! real displays, and tests use a recording in-memory implementation.
//!
//! Native events are converted into the plain [`NativeEvent`] enum before
//! they reach the translator, so translation is a pure function of the
//! event, the window state and whatever this seam answers.

use horizon_casement_core::{Point, Rect, Size};
use thiserror::Error;

/// Native window identifier (XID).
pub type Xid = u32;
/// Interned atom.
pub type Atom = u32;
/// Native cursor resource.
pub type CursorHandle = u32;
/// Native graphics context.
pub type GcHandle = u32;
/// Input-method context attached to a window.
pub type InputContextId = u32;
/// Server timestamp in milliseconds.
pub type Timestamp = u32;
/// Keyboard symbol.
pub type Keysym = u32;

/// Errors reported by the display server.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The connection failed or was closed.
    #[error("display connection error: {0}")]
    Connection(String),

    /// A request was answered with an error.
    #[error("request failed: {0}")]
    Reply(String),

    /// No more resource identifiers are available.
    #[error("failed to allocate a resource id: {0}")]
    IdAllocation(String),

    /// A required protocol extension is missing.
    #[error("missing extension: {0}")]
    MissingExtension(&'static str),
}

impl From<DisplayError> for horizon_casement_core::CasementError {
    fn from(err: DisplayError) -> Self {
        horizon_casement_core::CasementError::Connection(err.to_string())
    }
}

/// Result type for display server requests.
pub type DisplayResult<T> = Result<T, DisplayError>;

/// How a property write combines with the existing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyMode {
    Replace,
    Append,
}

/// `ButtonPress`/`ButtonRelease` details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub window: Xid,
    pub pressed: bool,
    /// Native button number (1 = left, 2 = middle, 3 = right, 4-7 wheel).
    pub button: u8,
    /// Position relative to the window, in device pixels.
    pub position: Point,
    /// Modifier/button state mask.
    pub state: u16,
    pub time: Timestamp,
}

/// `KeyPress`/`KeyRelease` details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub window: Xid,
    pub pressed: bool,
    pub keycode: u8,
    pub state: u16,
    pub time: Timestamp,
}

/// `MotionNotify` details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    pub window: Xid,
    pub position: Point,
    pub state: u16,
    pub time: Timestamp,
}

/// Why a crossing notification was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingMode {
    /// The pointer really entered or left the window.
    Normal,
    /// Side effect of a pointer grab (e.g. middle-button press).
    Grab,
    /// Side effect of a pointer ungrab.
    Ungrab,
}

/// `EnterNotify`/`LeaveNotify` details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingEvent {
    pub window: Xid,
    pub entered: bool,
    pub mode: CrossingMode,
    pub position: Point,
    pub state: u16,
}

/// Tablet tool reported through the input extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylusTool {
    Pen,
    Eraser,
}

/// What a tablet tool did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylusAction {
    Motion,
    /// A tool button went down (1 = tip).
    Press(u8),
    Release(u8),
}

/// Pen or eraser event from a tablet device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylusEvent {
    pub window: Xid,
    pub tool: StylusTool,
    pub action: StylusAction,
    /// Position relative to the window, in device pixels.
    pub position: Point,
    pub state: u16,
    /// Normalized to `0.0..=1.0`; zero when the device reports none.
    pub pressure: f32,
    pub time: Timestamp,
}

/// A 32-bit format client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientMessage {
    pub window: Xid,
    pub message_type: Atom,
    pub data: [u32; 5],
}

/// Native events the shell cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeEvent {
    /// Window geometry changed (`ConfigureNotify`).
    Configure { window: Xid, rect: Rect },
    /// Part of the window must be repainted (`Expose`).
    Expose { window: Xid, rect: Rect },
    Key(KeyEvent),
    Button(ButtonEvent),
    Motion(MotionEvent),
    Crossing(CrossingEvent),
    /// Tablet pen or eraser input. The core pointer event generated for
    /// the same action carries the same timestamp.
    Stylus(StylusEvent),
    ClientMessage(ClientMessage),
    /// A window property changed (`PropertyNotify`).
    Property { window: Xid, atom: Atom },
    /// The window was mapped (`MapNotify`).
    Map { window: Xid },
    /// The window was unmapped (`UnmapNotify`).
    Unmap { window: Xid },
}

impl NativeEvent {
    /// The window the event was reported for.
    pub fn window(&self) -> Xid {
        match self {
            NativeEvent::Configure { window, .. }
            | NativeEvent::Expose { window, .. }
            | NativeEvent::Property { window, .. }
            | NativeEvent::Map { window }
            | NativeEvent::Unmap { window } => *window,
            NativeEvent::Key(ev) => ev.window,
            NativeEvent::Button(ev) => ev.window,
            NativeEvent::Motion(ev) => ev.window,
            NativeEvent::Crossing(ev) => ev.window,
            NativeEvent::Stylus(ev) => ev.window,
            NativeEvent::ClientMessage(ev) => ev.window,
        }
    }
}

/// A cursor image in the native cursor channel order (`0xAARRGGBB`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    pub width: u32,
    pub height: u32,
    /// Hot spot in image pixels.
    pub hotspot: Point,
    /// Row-major pixels, `width * height` entries.
    pub pixels: Vec<u32>,
}

/// Native primitives needed by the window shell.
///
/// Requests that only change server state are fire-and-forget: an `Ok`
/// means the request was sent, not that the window manager acted on it.
pub trait DisplayServer {
    /// Root window of the default screen.
    fn root_window(&self) -> Xid;

    /// Default screen number.
    fn default_screen(&self) -> usize;

    /// Size of the default screen in device pixels.
    fn screen_size(&self) -> Size;

    /// Create a top-level input/output window selecting every event the
    /// shell handles.
    fn create_window(&self, rect: Rect) -> DisplayResult<Xid>;

    fn destroy_window(&self, window: Xid) -> DisplayResult<()>;

    fn map_window(&self, window: Xid) -> DisplayResult<()>;

    fn unmap_window(&self, window: Xid) -> DisplayResult<()>;

    fn resize_window(&self, window: Xid, size: Size) -> DisplayResult<()>;

    /// Window geometry relative to its parent.
    fn geometry(&self, window: Xid) -> DisplayResult<Rect>;

    /// Translate a point from one window's coordinates to another's.
    fn translate_coordinates(&self, src: Xid, dst: Xid, point: Point) -> DisplayResult<Point>;

    /// Intern an atom by name, creating it if needed.
    fn intern_atom(&self, name: &str) -> DisplayResult<Atom>;

    fn change_property32(
        &self,
        window: Xid,
        property: Atom,
        type_: Atom,
        mode: PropertyMode,
        data: &[u32],
    ) -> DisplayResult<()>;

    fn change_property8(&self, window: Xid, property: Atom, type_: Atom, data: &[u8]) -> DisplayResult<()>;

    /// Read up to `max_len` 32-bit items. `None` if the property is unset
    /// or has another type/format.
    fn get_property32(&self, window: Xid, property: Atom, type_: Atom, max_len: u32) -> DisplayResult<Option<Vec<u32>>>;

    /// Read an 8-bit property of any type.
    fn get_property8(&self, window: Xid, property: Atom) -> DisplayResult<Option<Vec<u8>>>;

    /// Send a client message to the root window with the substructure
    /// redirect/notify masks, as the window-manager protocol requires.
    fn send_client_message(&self, message: ClientMessage) -> DisplayResult<()>;

    fn grab_pointer(&self, window: Xid) -> DisplayResult<()>;

    fn ungrab_pointer(&self) -> DisplayResult<()>;

    /// Move the pointer to a device-pixel position inside `window`.
    fn warp_pointer(&self, window: Xid, position: Point) -> DisplayResult<()>;

    /// Create a cursor from the standard cursor font.
    fn create_font_cursor(&self, shape: u16) -> DisplayResult<CursorHandle>;

    /// Create a cursor with no visible pixels.
    fn create_empty_cursor(&self, window: Xid) -> DisplayResult<CursorHandle>;

    /// Whether the server can show 32-bit ARGB cursors.
    fn supports_argb_cursors(&self) -> bool;

    fn create_argb_cursor(&self, image: &CursorImage) -> DisplayResult<CursorHandle>;

    fn free_cursor(&self, cursor: CursorHandle) -> DisplayResult<()>;

    fn define_cursor(&self, window: Xid, cursor: CursorHandle) -> DisplayResult<()>;

    fn create_gc(&self, window: Xid) -> DisplayResult<GcHandle>;

    fn free_gc(&self, gc: GcHandle) -> DisplayResult<()>;

    /// Ask for pen and eraser events of the tablet devices on the
    /// window. Returns `false` when there are none to select.
    fn select_stylus_events(&self, window: Xid) -> bool;

    /// Open an input-method context for the window, if an input method
    /// is available.
    fn create_input_context(&self, window: Xid) -> Option<InputContextId>;

    fn destroy_input_context(&self, ic: InputContextId);

    /// Let the input method consume the key event. Returns `true` if the
    /// event was part of a composition and must not produce a keystroke.
    fn filter_key_event(&self, ic: Option<InputContextId>, event: &KeyEvent) -> bool;

    /// Text produced by the key event.
    fn lookup_text(&self, ic: Option<InputContextId>, event: &KeyEvent) -> Option<String>;

    /// Unshifted keysym for a keycode.
    fn keysym(&self, keycode: u8) -> Keysym;

    /// Look at the next queued event without removing it.
    fn peek_event(&self) -> Option<NativeEvent>;

    /// Remove and return the next queued event without blocking.
    fn poll_event(&self) -> DisplayResult<Option<NativeEvent>>;

    /// Block until the next event arrives.
    fn wait_event(&self) -> DisplayResult<NativeEvent>;

    fn flush(&self) -> DisplayResult<()>;
}
