//! Core vocabulary for Horizon Casement.
//!
//! This crate holds everything the native window shell shares across
//! platforms:
//!
//! - **Geometry**: integer points, sizes, rectangles and decoration insets
//! - **Events**: the canonical event model and event-queue sinks
//! - **Keys**: physical scancodes and the modifier bitset
//! - **Cursors**: the symbolic cursor set and interactive window actions
//! - **Surfaces**: read-only pixel access for icons and bitmap cursors
//! - **Window contract**: the [`PlatformWindow`] trait and [`WindowSpec`]
//!
//! # Example
//!
//! ```
//! use horizon_casement_core::{Border, Rect};
//!
//! let content = Rect::new(100, 100, 800, 600);
//! let insets = Border::new(1, 28, 1, 1);
//! assert_eq!(content.enlarged(insets), Rect::new(99, 72, 802, 629));
//! ```

pub mod cursor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod keys;
pub mod logging;
pub mod surface;
pub mod window;
pub mod window_spec;

pub use cursor::{NativeCursor, WindowAction};
pub use error::{CasementError, Result};
pub use event::{
    ChannelEventQueue, Event, EventBuffer, EventKind, EventQueue, MouseButton, PointerType, WindowId,
};
pub use geometry::{Border, Point, Rect, Size};
pub use keys::{KeyModifiers, KeyScancode};
pub use surface::{ImageSurface, Surface, SurfaceError, SurfaceFormat};
pub use window::{ColorSpace, PlatformWindow, ScreenInfo};
pub use window_spec::WindowSpec;
