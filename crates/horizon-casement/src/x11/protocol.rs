//! Window-manager protocol client (ICCCM and EWMH).
//!
//! Every request here is a fire-and-forget message to the window manager.
//! There is no acknowledgment: code that needs the outcome of a state
//! change must poll the corresponding property later.

use tracing::{debug, trace, warn};

use horizon_casement_core::logging::targets;
use horizon_casement_core::{Border, MouseButton, Point, Rect, Surface, WindowAction};

use super::atoms::{self, Atoms};
use super::display::{Atom, ClientMessage, DisplayResult, DisplayServer, PropertyMode, Xid};

/// `_NET_WM_STATE` actions.
pub const NET_WM_STATE_REMOVE: u32 = 0;
pub const NET_WM_STATE_ADD: u32 = 1;

/// `WM_CHANGE_STATE` argument requesting iconification.
pub const ICONIC_STATE: u32 = 3;

/// `_NET_WM_MOVERESIZE` directions.
pub mod moveresize {
    pub const SIZE_TOPLEFT: u32 = 0;
    pub const SIZE_TOP: u32 = 1;
    pub const SIZE_TOPRIGHT: u32 = 2;
    pub const SIZE_RIGHT: u32 = 3;
    pub const SIZE_BOTTOMRIGHT: u32 = 4;
    pub const SIZE_BOTTOM: u32 = 5;
    pub const SIZE_BOTTOMLEFT: u32 = 6;
    pub const SIZE_LEFT: u32 = 7;
    pub const MOVE: u32 = 8;
    pub const CANCEL: u32 = 11;
}

// WM_NORMAL_HINTS flags.
const P_POSITION: u32 = 1 << 2;
const P_SIZE: u32 = 1 << 3;
const P_RESIZE_INC: u32 = 1 << 6;
const P_WIN_GRAVITY: u32 = 1 << 9;
const SOUTH_GRAVITY: u32 = 8;

/// `_MOTIF_WM_HINTS` value that removes decorations but keeps WM behavior.
const MOTIF_NO_DECORATIONS: u32 = 2;

/// Length argument that reads a list property in full.
const WHOLE_PROPERTY: u32 = u32::MAX / 4;

/// Map a window action to its `_NET_WM_MOVERESIZE` direction.
pub fn moveresize_direction(action: WindowAction) -> u32 {
    match action {
        WindowAction::Cancel => moveresize::CANCEL,
        WindowAction::Move => moveresize::MOVE,
        WindowAction::ResizeFromTopLeft => moveresize::SIZE_TOPLEFT,
        WindowAction::ResizeFromTop => moveresize::SIZE_TOP,
        WindowAction::ResizeFromTopRight => moveresize::SIZE_TOPRIGHT,
        WindowAction::ResizeFromLeft => moveresize::SIZE_LEFT,
        WindowAction::ResizeFromRight => moveresize::SIZE_RIGHT,
        WindowAction::ResizeFromBottomLeft => moveresize::SIZE_BOTTOMLEFT,
        WindowAction::ResizeFromBottom => moveresize::SIZE_BOTTOM,
        WindowAction::ResizeFromBottomRight => moveresize::SIZE_BOTTOMRIGHT,
    }
}

/// Native button number for a mouse button, 0 if none.
pub fn native_button(button: MouseButton) -> u32 {
    match button {
        MouseButton::None => 0,
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
        MouseButton::X1 => 8,
        MouseButton::X2 => 9,
    }
}

/// Encode `WM_NORMAL_HINTS` for the initial window placement.
pub fn encode_size_hints(rect: Rect, increment: i32) -> [u32; 18] {
    let mut hints = [0u32; 18];
    hints[0] = P_POSITION | P_SIZE | P_RESIZE_INC | P_WIN_GRAVITY;
    hints[1] = rect.x as u32;
    hints[2] = rect.y as u32;
    hints[3] = rect.width as u32;
    hints[4] = rect.height as u32;
    hints[9] = increment as u32;
    hints[10] = increment as u32;
    hints[17] = SOUTH_GRAVITY;
    hints
}

/// Encode `WM_CLASS`: the instance and class names, each NUL-terminated.
pub fn encode_wm_class(instance: &str, class: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(instance.len() + class.len() + 2);
    data.extend_from_slice(instance.as_bytes());
    data.push(0);
    data.extend_from_slice(class.as_bytes());
    data.push(0);
    data
}

/// Encode text for a `STRING` property. Characters outside Latin-1
/// become `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}

/// Decode a `STRING` property.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Encode one `_NET_WM_ICON` entry: width, height, then `0xAARRGGBB` pixels.
pub fn encode_icon(icon: &dyn Surface) -> Vec<u32> {
    let (width, height) = (icon.width(), icon.height());
    let format = icon.format();

    let mut data = Vec::with_capacity(2 + (width * height) as usize);
    data.push(width);
    data.push(height);
    for y in 0..height {
        data.extend(icon.row(y).iter().map(|&pixel| format.to_argb(pixel)));
    }
    data
}

/// Decode `_NET_FRAME_EXTENTS` (left, right, top, bottom).
pub fn decode_frame_extents(values: &[u32]) -> Option<Border> {
    match *values {
        [left, right, top, bottom, ..] => Some(Border::new(
            left as i32,
            top as i32,
            right as i32,
            bottom as i32,
        )),
        _ => None,
    }
}

/// Client for the window-manager protocols of one display connection.
pub struct WmClient<'a> {
    display: &'a dyn DisplayServer,
    atoms: &'a Atoms,
}

impl<'a> WmClient<'a> {
    pub fn new(display: &'a dyn DisplayServer, atoms: &'a Atoms) -> Self {
        Self { display, atoms }
    }

    fn report(&self, what: &str, window: Xid, result: DisplayResult<()>) {
        if let Err(err) = result {
            warn!(target: targets::PROTOCOL, window, %err, "{what} failed");
        }
    }

    fn missing(&self, what: &str) {
        debug!(target: targets::PROTOCOL, "{what}: atoms unavailable, request skipped");
    }

    fn send(&self, what: &str, window: Xid, message_type: Atom, data: [u32; 5]) {
        trace!(target: targets::PROTOCOL, window, ?data, "{what}");
        let result = self.display.send_client_message(ClientMessage {
            window,
            message_type,
            data,
        });
        self.report(what, window, result);
    }

    // =========================================================================
    // Creation-time hints
    // =========================================================================

    /// Set `WM_CLASS`.
    pub fn set_class_hint(&self, window: Xid, instance: &str, class: &str) {
        let data = encode_wm_class(instance, class);
        let result = self
            .display
            .change_property8(window, atoms::WM_CLASS, atoms::STRING, &data);
        self.report("set WM_CLASS", window, result);
    }

    /// Set `WM_NORMAL_HINTS` with position, size, resize increment and
    /// south gravity.
    pub fn set_normal_hints(&self, window: Xid, rect: Rect, increment: i32) {
        let hints = encode_size_hints(rect, increment);
        let result = self.display.change_property32(
            window,
            atoms::WM_NORMAL_HINTS,
            atoms::WM_SIZE_HINTS,
            PropertyMode::Replace,
            &hints,
        );
        self.report("set WM_NORMAL_HINTS", window, result);
    }

    /// Opt in to `WM_DELETE_WINDOW` close negotiation.
    pub fn set_protocols(&self, window: Xid) {
        let (Some(protocols), Some(delete)) = (self.atoms.wm_protocols, self.atoms.wm_delete_window) else {
            return self.missing("set WM_PROTOCOLS");
        };
        let result = self
            .display
            .change_property32(window, protocols, atoms::ATOM, PropertyMode::Replace, &[delete]);
        self.report("set WM_PROTOCOLS", window, result);
    }

    /// Mark the window as a utility window, falling back to normal.
    pub fn set_floating_type(&self, window: Xid) {
        let (Some(kind), Some(utility), Some(normal)) = (
            self.atoms.net_wm_window_type,
            self.atoms.net_wm_window_type_utility,
            self.atoms.net_wm_window_type_normal,
        ) else {
            return self.missing("set _NET_WM_WINDOW_TYPE");
        };
        let result = self.display.change_property32(
            window,
            kind,
            atoms::ATOM,
            PropertyMode::Replace,
            &[utility, normal],
        );
        self.report("set _NET_WM_WINDOW_TYPE", window, result);
    }

    /// Remove decorations while keeping WM move/resize behavior.
    pub fn set_borderless(&self, window: Xid) {
        let Some(hints) = self.atoms.motif_wm_hints else {
            return self.missing("set _MOTIF_WM_HINTS");
        };
        let result = self.display.change_property32(
            window,
            hints,
            atoms::CARDINAL,
            PropertyMode::Replace,
            &[MOTIF_NO_DECORATIONS],
        );
        self.report("set _MOTIF_WM_HINTS", window, result);
    }

    /// Set `WM_TRANSIENT_FOR`.
    pub fn set_transient_for(&self, window: Xid, parent: Xid) {
        let result = self.display.change_property32(
            window,
            atoms::WM_TRANSIENT_FOR,
            atoms::WINDOW,
            PropertyMode::Replace,
            &[parent],
        );
        self.report("set WM_TRANSIENT_FOR", window, result);
    }

    // =========================================================================
    // State requests
    // =========================================================================

    /// Ask the window manager to raise and focus the window.
    pub fn activate(&self, window: Xid) {
        let Some(active) = self.atoms.net_active_window else {
            return self.missing("activate");
        };
        // Source indication 1 = application, timestamp = CurrentTime.
        self.send("_NET_ACTIVE_WINDOW", window, active, [1, 0, 0, 0, 0]);
    }

    /// Ask the window manager to iconify the window.
    pub fn iconify(&self, window: Xid) {
        let Some(change_state) = self.atoms.wm_change_state else {
            return self.missing("iconify");
        };
        self.send("WM_CHANGE_STATE", window, change_state, [ICONIC_STATE, 0, 0, 0, 0]);
    }

    /// Add or remove the fullscreen state. Returns `false` if the request
    /// could not be expressed.
    pub fn request_fullscreen(&self, window: Xid, state: bool) -> bool {
        let (Some(wm_state), Some(fullscreen)) = (self.atoms.net_wm_state, self.atoms.net_wm_state_fullscreen) else {
            self.missing("fullscreen");
            return false;
        };
        let action = if state { NET_WM_STATE_ADD } else { NET_WM_STATE_REMOVE };
        self.send("_NET_WM_STATE fullscreen", window, wm_state, [action, fullscreen, 0, 0, 0]);
        true
    }

    /// Toggle both maximized states, removing them if the window manager
    /// currently reports the window as maximized.
    pub fn toggle_maximized(&self, window: Xid) {
        let (Some(wm_state), Some(vert), Some(horz)) = (
            self.atoms.net_wm_state,
            self.atoms.net_wm_state_maximized_vert,
            self.atoms.net_wm_state_maximized_horz,
        ) else {
            return self.missing("maximize");
        };
        let action = if self.is_maximized(window) {
            NET_WM_STATE_REMOVE
        } else {
            NET_WM_STATE_ADD
        };
        self.send("_NET_WM_STATE maximize", window, wm_state, [action, vert, horz, 0, 0]);
    }

    /// Live query of `_NET_WM_STATE`: maximized in either direction.
    pub fn is_maximized(&self, window: Xid) -> bool {
        let Some(wm_state) = self.atoms.net_wm_state else {
            return false;
        };
        let maximized = [self.atoms.net_wm_state_maximized_vert, self.atoms.net_wm_state_maximized_horz];
        match self.display.get_property32(window, wm_state, atoms::ATOM, WHOLE_PROPERTY) {
            Ok(Some(states)) => states.iter().any(|state| maximized.contains(&Some(*state))),
            Ok(None) => false,
            Err(err) => {
                debug!(target: targets::PROTOCOL, window, %err, "cannot read _NET_WM_STATE");
                false
            }
        }
    }

    /// Start an interactive move/resize at a root-relative pointer
    /// position. Any pointer grab is released first, except when
    /// cancelling.
    pub fn begin_move_resize(&self, window: Xid, root_position: Point, action: WindowAction, button: MouseButton) {
        let Some(moveresize) = self.atoms.net_wm_moveresize else {
            return self.missing("move/resize");
        };
        let direction = moveresize_direction(action);
        if direction != moveresize::CANCEL {
            let result = self.display.ungrab_pointer();
            self.report("ungrab pointer", window, result);
        }
        self.send(
            "_NET_WM_MOVERESIZE",
            window,
            moveresize,
            [
                root_position.x as u32,
                root_position.y as u32,
                direction,
                native_button(button),
                0,
            ],
        );
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Write the title to both `WM_NAME` (Latin-1) and `_NET_WM_NAME`
    /// (UTF-8).
    pub fn set_title(&self, window: Xid, title: &str) {
        let result = self
            .display
            .change_property8(window, atoms::WM_NAME, atoms::STRING, &encode_latin1(title));
        self.report("set WM_NAME", window, result);

        if let (Some(name), Some(utf8)) = (self.atoms.net_wm_name, self.atoms.utf8_string) {
            let result = self.display.change_property8(window, name, utf8, title.as_bytes());
            self.report("set _NET_WM_NAME", window, result);
        }
    }

    /// Read the title: `_NET_WM_NAME`, then `WM_NAME`, then empty.
    pub fn title(&self, window: Xid) -> String {
        let read = |property: Atom| match self.display.get_property8(window, property) {
            Ok(value) => value,
            Err(err) => {
                debug!(target: targets::PROTOCOL, window, %err, "cannot read title property");
                None
            }
        };
        if let Some(bytes) = self.atoms.net_wm_name.and_then(read) {
            return String::from_utf8_lossy(&bytes).into_owned();
        }
        read(atoms::WM_NAME)
            .map(|bytes| decode_latin1(&bytes))
            .unwrap_or_default()
    }

    /// Replace `_NET_WM_ICON` with the given icons.
    pub fn set_icons(&self, window: Xid, icons: &[&dyn Surface]) {
        let Some(net_wm_icon) = self.atoms.net_wm_icon else {
            return self.missing("set _NET_WM_ICON");
        };
        for (index, icon) in icons.iter().enumerate() {
            let mode = if index == 0 { PropertyMode::Replace } else { PropertyMode::Append };
            let data = encode_icon(*icon);
            let result = self
                .display
                .change_property32(window, net_wm_icon, atoms::CARDINAL, mode, &data);
            self.report("set _NET_WM_ICON", window, result);
        }
    }

    /// Current decoration insets, or `None` if the window manager has not
    /// published them.
    pub fn frame_extents(&self, window: Xid) -> Option<Border> {
        let extents = self.atoms.net_frame_extents?;
        match self.display.get_property32(window, extents, atoms::CARDINAL, 4) {
            Ok(values) => values.as_deref().and_then(decode_frame_extents),
            Err(err) => {
                debug!(target: targets::PROTOCOL, window, %err, "cannot read _NET_FRAME_EXTENTS");
                None
            }
        }
    }

    /// Overwrite `_NET_FRAME_EXTENTS` with zero insets.
    pub fn clear_frame_extents(&self, window: Xid) {
        let Some(extents) = self.atoms.net_frame_extents else {
            return;
        };
        let result = self
            .display
            .change_property32(window, extents, atoms::CARDINAL, PropertyMode::Replace, &[0; 4]);
        self.report("clear _NET_FRAME_EXTENTS", window, result);
    }

    /// Whether a property notification is about `_NET_FRAME_EXTENTS`.
    pub fn is_frame_extents(&self, atom: Atom) -> bool {
        self.atoms.net_frame_extents == Some(atom)
    }

    /// Whether a client message is a `WM_DELETE_WINDOW` close request.
    pub fn is_close_request(&self, message: &ClientMessage) -> bool {
        self.atoms.wm_delete_window.is_some_and(|delete| message.data[0] == delete)
    }
}
