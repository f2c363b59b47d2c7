//! Keyboard vocabulary: physical key codes and modifier sets.

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of keyboard modifiers represented as bit flags.
///
/// # Example
///
/// ```
/// use horizon_casement_core::KeyModifiers;
///
/// let mods = KeyModifiers::SHIFT | KeyModifiers::CTRL;
/// assert!(mods.contains(KeyModifiers::SHIFT));
/// assert!(!mods.contains(KeyModifiers::ALT));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers(u8);

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: KeyModifiers = KeyModifiers(0);
    /// Shift key.
    pub const SHIFT: KeyModifiers = KeyModifiers(1 << 0);
    /// Control key.
    pub const CTRL: KeyModifiers = KeyModifiers(1 << 1);
    /// Alt (Option) key.
    pub const ALT: KeyModifiers = KeyModifiers(1 << 2);
    /// Space bar held down (used as a tool modifier by applications).
    pub const SPACE: KeyModifiers = KeyModifiers(1 << 3);
    /// Windows / Super / Meta key.
    pub const WIN: KeyModifiers = KeyModifiers(1 << 4);

    /// Raw bit representation.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Check if all the given modifiers are in this set.
    pub fn contains(&self, other: KeyModifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if no modifier is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for KeyModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        KeyModifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for KeyModifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for KeyModifiers {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        KeyModifiers(self.0 & rhs.0)
    }
}

/// Physical key identifier, independent of the keyboard layout's text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyScancode {
    /// Unknown or unmapped key.
    #[default]
    Nil,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Esc,
    Tilde,
    Minus,
    Equals,
    Backspace,
    Tab,
    OpenBrace,
    CloseBrace,
    Enter,
    Colon,
    Quote,
    Backslash,
    Comma,
    Stop,
    Slash,
    Space,
    Insert,
    Del,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
    NumpadSlash,
    NumpadAsterisk,
    NumpadMinus,
    NumpadPlus,
    NumpadDel,
    NumpadEnter,
    PrintScreen,
    Pause,
    Menu,
    LShift,
    RShift,
    LControl,
    RControl,
    Alt,
    AltGr,
    LWin,
    RWin,
    ScrLock,
    NumLock,
    CapsLock,
}

impl KeyScancode {
    /// Check if this is one of the modifier keys.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            KeyScancode::LShift
                | KeyScancode::RShift
                | KeyScancode::LControl
                | KeyScancode::RControl
                | KeyScancode::Alt
                | KeyScancode::AltGr
                | KeyScancode::LWin
                | KeyScancode::RWin
        )
    }
}
