//! Horizon Casement - the native window shell for Horizon.
//!
//! This crate turns native X11 windows into a uniform, platform-neutral
//! window model:
//!
//! - [`WindowRegistry`] maps window identifiers to live windows
//! - the cursor synthesizer turns symbolic or bitmap cursors into native
//!   cursors
//! - the window-manager protocol client drives maximize, fullscreen,
//!   iconify, interactive move/resize, titles, icons and decoration hints
//! - the event translator turns native input into canonical [`Event`]s
//!
//! Everything in [`horizon_casement_core`] is re-exported here.
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use horizon_casement::{platform::DefaultSystem, EventBuffer, EventKind, ShellConfig, WindowSpec};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let events = Rc::new(EventBuffer::new());
//!     let system = DefaultSystem::connect(ShellConfig::default(), events.clone())?;
//!     let window = system.create_window(&WindowSpec::new("Hello"))?;
//!
//!     'outer: loop {
//!         system.wait_and_dispatch()?;
//!         for event in events.drain() {
//!             if event.kind == EventKind::CloseWindow {
//!                 break 'outer;
//!             }
//!         }
//!     }
//!     system.destroy_window(window)?;
//!     Ok(())
//! }
//! ```

pub use horizon_casement_core::*;

pub mod config;
pub mod registry;
pub mod x11;

pub use config::ShellConfig;
pub use registry::{WindowRef, WindowRegistry};

/// The backend used on the current platform.
pub mod platform {
    /// Window system for the current platform.
    pub type DefaultSystem = crate::x11::X11System;
}
