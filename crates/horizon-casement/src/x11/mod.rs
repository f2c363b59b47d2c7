//! X11 backend.
//!
//! [`X11System`] owns the display connection and a registry of
//! [`X11Window`]s. Native events are read from the connection, routed to
//! the window they belong to and translated into canonical
//! [`Event`](horizon_casement_core::Event)s on the caller's queue.
//!
//! The backend talks to the server only through [`DisplayServer`]. On
//! Linux, [`X11System::connect`] opens an `x11rb` connection; any other
//! implementation can be plugged in with [`X11System::with_display`].

pub mod atoms;
pub mod cursor;
pub mod display;
pub mod keys;
pub mod protocol;
mod system;
mod translator;
mod window;

#[cfg(target_os = "linux")]
mod compose;
#[cfg(target_os = "linux")]
mod connection;

#[cfg(test)]
mod testing;

pub use atoms::Atoms;
pub use display::{
    Atom, ButtonEvent, ClientMessage, CrossingEvent, CrossingMode, CursorHandle, CursorImage, DisplayError,
    DisplayResult, DisplayServer, KeyEvent, MotionEvent, NativeEvent, PropertyMode, StylusAction, StylusEvent, StylusTool, Xid,
};
pub use protocol::WmClient;
pub use system::X11System;
pub use window::X11Window;

#[cfg(target_os = "linux")]
pub use connection::X11Connection;
