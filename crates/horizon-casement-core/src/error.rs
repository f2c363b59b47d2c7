//! Error types for Horizon Casement.

use thiserror::Error;

use crate::event::WindowId;
use crate::surface::SurfaceError;

/// The main error type for window shell operations.
///
/// Only resource acquisition surfaces as an error. Optional platform
/// capabilities that turn out to be missing (decoration insets, ARGB
/// cursors, window-manager atoms) degrade to documented defaults instead.
#[derive(Debug, Error)]
pub enum CasementError {
    /// The connection to the display server could not be established.
    #[error("failed to connect to the display server: {0}")]
    Connection(String),

    /// The platform refused to create a native window.
    #[error("failed to create window: {0}")]
    WindowCreation(String),

    /// A window with this native identifier is already registered.
    #[error("window {0} is already registered")]
    DuplicateWindow(WindowId),

    /// No window is registered under this native identifier.
    #[error("window {0} is not registered")]
    UnknownWindow(WindowId),

    /// Surface-related error.
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// A specialized Result type for Horizon Casement operations.
pub type Result<T> = std::result::Result<T, CasementError>;
