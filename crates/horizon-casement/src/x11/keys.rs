//! Keysym and modifier-mask mapping.

use horizon_casement_core::{KeyModifiers, KeyScancode};

use super::display::Keysym;

/// Keysyms referenced by the translator.
#[allow(non_upper_case_globals)]
pub mod keysym {
    use super::Keysym;

    pub const XK_space: Keysym = 0x0020;
    pub const XK_BackSpace: Keysym = 0xff08;
    pub const XK_Tab: Keysym = 0xff09;
    pub const XK_Return: Keysym = 0xff0d;
    pub const XK_Pause: Keysym = 0xff13;
    pub const XK_Scroll_Lock: Keysym = 0xff14;
    pub const XK_Escape: Keysym = 0xff1b;
    pub const XK_Home: Keysym = 0xff50;
    pub const XK_Left: Keysym = 0xff51;
    pub const XK_Up: Keysym = 0xff52;
    pub const XK_Right: Keysym = 0xff53;
    pub const XK_Down: Keysym = 0xff54;
    pub const XK_Prior: Keysym = 0xff55;
    pub const XK_Next: Keysym = 0xff56;
    pub const XK_End: Keysym = 0xff57;
    pub const XK_Print: Keysym = 0xff61;
    pub const XK_Insert: Keysym = 0xff63;
    pub const XK_Menu: Keysym = 0xff67;
    pub const XK_Num_Lock: Keysym = 0xff7f;
    pub const XK_KP_Enter: Keysym = 0xff8d;
    pub const XK_KP_Home: Keysym = 0xff95;
    pub const XK_KP_Left: Keysym = 0xff96;
    pub const XK_KP_Up: Keysym = 0xff97;
    pub const XK_KP_Right: Keysym = 0xff98;
    pub const XK_KP_Down: Keysym = 0xff99;
    pub const XK_KP_Prior: Keysym = 0xff9a;
    pub const XK_KP_Next: Keysym = 0xff9b;
    pub const XK_KP_End: Keysym = 0xff9c;
    pub const XK_KP_Begin: Keysym = 0xff9d;
    pub const XK_KP_Insert: Keysym = 0xff9e;
    pub const XK_KP_Delete: Keysym = 0xff9f;
    pub const XK_KP_Multiply: Keysym = 0xffaa;
    pub const XK_KP_Add: Keysym = 0xffab;
    pub const XK_KP_Subtract: Keysym = 0xffad;
    pub const XK_KP_Decimal: Keysym = 0xffae;
    pub const XK_KP_Divide: Keysym = 0xffaf;
    pub const XK_KP_0: Keysym = 0xffb0;
    pub const XK_KP_9: Keysym = 0xffb9;
    pub const XK_F1: Keysym = 0xffbe;
    pub const XK_F12: Keysym = 0xffc9;
    pub const XK_Shift_L: Keysym = 0xffe1;
    pub const XK_Shift_R: Keysym = 0xffe2;
    pub const XK_Control_L: Keysym = 0xffe3;
    pub const XK_Control_R: Keysym = 0xffe4;
    pub const XK_Caps_Lock: Keysym = 0xffe5;
    pub const XK_Meta_L: Keysym = 0xffe7;
    pub const XK_Meta_R: Keysym = 0xffe8;
    pub const XK_Alt_L: Keysym = 0xffe9;
    pub const XK_Alt_R: Keysym = 0xffea;
    pub const XK_Super_L: Keysym = 0xffeb;
    pub const XK_Super_R: Keysym = 0xffec;
    pub const XK_ISO_Level3_Shift: Keysym = 0xfe03;
    pub const XK_Delete: Keysym = 0xffff;
}

/// Modifier bits of the core protocol state mask.
pub mod mask {
    pub const SHIFT: u16 = 1 << 0;
    pub const CONTROL: u16 = 1 << 2;
    pub const MOD1: u16 = 1 << 3;
    pub const MOD4: u16 = 1 << 6;
}

/// Modifiers held according to a native state mask.
pub fn modifiers_from_state(state: u16) -> KeyModifiers {
    let mut modifiers = KeyModifiers::NONE;
    if state & mask::SHIFT != 0 {
        modifiers |= KeyModifiers::SHIFT;
    }
    if state & mask::CONTROL != 0 {
        modifiers |= KeyModifiers::CTRL;
    }
    if state & mask::MOD1 != 0 {
        modifiers |= KeyModifiers::ALT;
    }
    if state & mask::MOD4 != 0 {
        modifiers |= KeyModifiers::WIN;
    }
    modifiers
}

/// The modifier a modifier-only key contributes by being pressed.
pub fn modifier_for_keysym(sym: Keysym) -> KeyModifiers {
    use keysym::*;
    match sym {
        XK_Shift_L | XK_Shift_R => KeyModifiers::SHIFT,
        XK_Control_L | XK_Control_R => KeyModifiers::CTRL,
        XK_Alt_L | XK_Alt_R => KeyModifiers::ALT,
        XK_Meta_L | XK_Meta_R | XK_Super_L | XK_Super_R => KeyModifiers::WIN,
        _ => KeyModifiers::NONE,
    }
}

/// Physical key for an unshifted keysym.
pub fn scancode_from_keysym(sym: Keysym) -> KeyScancode {
    use keysym::*;
    use KeyScancode as K;

    const LETTERS: [KeyScancode; 26] = [
        K::A, K::B, K::C, K::D, K::E, K::F, K::G, K::H, K::I, K::J, K::K, K::L, K::M,
        K::N, K::O, K::P, K::Q, K::R, K::S, K::T, K::U, K::V, K::W, K::X, K::Y, K::Z,
    ];
    const DIGITS: [KeyScancode; 10] = [
        K::Key0, K::Key1, K::Key2, K::Key3, K::Key4, K::Key5, K::Key6, K::Key7, K::Key8, K::Key9,
    ];
    const NUMPAD: [KeyScancode; 10] = [
        K::Numpad0, K::Numpad1, K::Numpad2, K::Numpad3, K::Numpad4,
        K::Numpad5, K::Numpad6, K::Numpad7, K::Numpad8, K::Numpad9,
    ];
    const FUNCTION: [KeyScancode; 12] = [
        K::F1, K::F2, K::F3, K::F4, K::F5, K::F6, K::F7, K::F8, K::F9, K::F10, K::F11, K::F12,
    ];

    match sym {
        0x61..=0x7a => LETTERS[(sym - 0x61) as usize],
        0x41..=0x5a => LETTERS[(sym - 0x41) as usize],
        0x30..=0x39 => DIGITS[(sym - 0x30) as usize],
        XK_KP_0..=XK_KP_9 => NUMPAD[(sym - XK_KP_0) as usize],
        XK_F1..=XK_F12 => FUNCTION[(sym - XK_F1) as usize],
        XK_space => K::Space,
        0x60 => K::Tilde,
        0x2d => K::Minus,
        0x3d => K::Equals,
        0x5b => K::OpenBrace,
        0x5d => K::CloseBrace,
        0x3b => K::Colon,
        0x27 => K::Quote,
        0x5c => K::Backslash,
        0x2c => K::Comma,
        0x2e => K::Stop,
        0x2f => K::Slash,
        XK_Escape => K::Esc,
        XK_BackSpace => K::Backspace,
        XK_Tab => K::Tab,
        XK_Return => K::Enter,
        XK_Pause => K::Pause,
        XK_Scroll_Lock => K::ScrLock,
        XK_Print => K::PrintScreen,
        XK_Insert => K::Insert,
        XK_Delete => K::Del,
        XK_Home => K::Home,
        XK_End => K::End,
        XK_Prior => K::PageUp,
        XK_Next => K::PageDown,
        XK_Left => K::Left,
        XK_Right => K::Right,
        XK_Up => K::Up,
        XK_Down => K::Down,
        XK_Menu => K::Menu,
        XK_Num_Lock => K::NumLock,
        XK_Caps_Lock => K::CapsLock,
        // Keypad keys report their navigation keysym at level 0.
        XK_KP_Insert => K::Numpad0,
        XK_KP_End => K::Numpad1,
        XK_KP_Down => K::Numpad2,
        XK_KP_Next => K::Numpad3,
        XK_KP_Left => K::Numpad4,
        XK_KP_Begin => K::Numpad5,
        XK_KP_Right => K::Numpad6,
        XK_KP_Home => K::Numpad7,
        XK_KP_Up => K::Numpad8,
        XK_KP_Prior => K::Numpad9,
        XK_KP_Delete | XK_KP_Decimal => K::NumpadDel,
        XK_KP_Enter => K::NumpadEnter,
        XK_KP_Divide => K::NumpadSlash,
        XK_KP_Multiply => K::NumpadAsterisk,
        XK_KP_Subtract => K::NumpadMinus,
        XK_KP_Add => K::NumpadPlus,
        XK_Shift_L => K::LShift,
        XK_Shift_R => K::RShift,
        XK_Control_L => K::LControl,
        XK_Control_R => K::RControl,
        XK_Alt_L | XK_Meta_L => K::Alt,
        XK_Alt_R | XK_Meta_R | XK_ISO_Level3_Shift => K::AltGr,
        XK_Super_L => K::LWin,
        XK_Super_R => K::RWin,
        _ => K::Nil,
    }
}

/// Character a keysym produces, for printable keysyms.
///
/// Latin-1 keysyms map to themselves; Unicode keysyms carry the code point
/// in their low 24 bits.
pub fn keysym_to_char(sym: Keysym) -> Option<char> {
    match sym {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(sym),
        0x0100_0000..=0x0110_ffff => char::from_u32(sym - 0x0100_0000),
        keysym::XK_KP_0..=keysym::XK_KP_9 => char::from_u32('0' as u32 + sym - keysym::XK_KP_0),
        keysym::XK_Return | keysym::XK_KP_Enter => Some('\r'),
        keysym::XK_Tab => Some('\t'),
        keysym::XK_BackSpace => Some('\u{8}'),
        keysym::XK_Escape => Some('\u{1b}'),
        keysym::XK_Delete => Some('\u{7f}'),
        _ => None,
    }
}
