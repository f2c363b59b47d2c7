//! Atoms used by the window shell.

use tracing::warn;

use horizon_casement_core::logging::targets;

use super::display::{Atom, DisplayServer};

// Predefined atoms (fixed by the core protocol).
pub const ATOM: Atom = 4;
pub const CARDINAL: Atom = 6;
pub const STRING: Atom = 31;
pub const WINDOW: Atom = 33;
pub const WM_NAME: Atom = 39;
pub const WM_NORMAL_HINTS: Atom = 40;
pub const WM_SIZE_HINTS: Atom = 41;
pub const WM_CLASS: Atom = 67;
pub const WM_TRANSIENT_FOR: Atom = 68;

/// Atoms interned once per display connection.
///
/// A `None` entry means interning failed; every feature depending on it
/// silently turns into a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atoms {
    pub wm_protocols: Option<Atom>,
    pub wm_delete_window: Option<Atom>,
    pub wm_change_state: Option<Atom>,
    pub utf8_string: Option<Atom>,
    pub net_wm_name: Option<Atom>,
    pub net_wm_icon: Option<Atom>,
    pub net_frame_extents: Option<Atom>,
    pub net_wm_state: Option<Atom>,
    pub net_wm_state_maximized_vert: Option<Atom>,
    pub net_wm_state_maximized_horz: Option<Atom>,
    pub net_wm_state_fullscreen: Option<Atom>,
    pub net_active_window: Option<Atom>,
    pub net_wm_moveresize: Option<Atom>,
    pub net_wm_window_type: Option<Atom>,
    pub net_wm_window_type_utility: Option<Atom>,
    pub net_wm_window_type_normal: Option<Atom>,
    pub motif_wm_hints: Option<Atom>,
}

impl Atoms {
    /// Intern every atom the shell uses.
    pub fn intern(display: &dyn DisplayServer) -> Self {
        let get = |name: &str| match display.intern_atom(name) {
            Ok(0) => None,
            Ok(atom) => Some(atom),
            Err(err) => {
                warn!(target: targets::DISPLAY, atom = name, %err, "failed to intern atom");
                None
            }
        };

        Self {
            wm_protocols: get("WM_PROTOCOLS"),
            wm_delete_window: get("WM_DELETE_WINDOW"),
            wm_change_state: get("WM_CHANGE_STATE"),
            utf8_string: get("UTF8_STRING"),
            net_wm_name: get("_NET_WM_NAME"),
            net_wm_icon: get("_NET_WM_ICON"),
            net_frame_extents: get("_NET_FRAME_EXTENTS"),
            net_wm_state: get("_NET_WM_STATE"),
            net_wm_state_maximized_vert: get("_NET_WM_STATE_MAXIMIZED_VERT"),
            net_wm_state_maximized_horz: get("_NET_WM_STATE_MAXIMIZED_HORZ"),
            net_wm_state_fullscreen: get("_NET_WM_STATE_FULLSCREEN"),
            net_active_window: get("_NET_ACTIVE_WINDOW"),
            net_wm_moveresize: get("_NET_WM_MOVERESIZE"),
            net_wm_window_type: get("_NET_WM_WINDOW_TYPE"),
            net_wm_window_type_utility: get("_NET_WM_WINDOW_TYPE_UTILITY"),
            net_wm_window_type_normal: get("_NET_WM_WINDOW_TYPE_NORMAL"),
            motif_wm_hints: get("_MOTIF_WM_HINTS"),
        }
    }
}
