//! Symbolic cursors and interactive window actions.

/// A named system cursor shape.
///
/// Backends map each value to a fixed native cursor resource.
/// [`NativeCursor::Hidden`] is special: it hides the pointer over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativeCursor {
    Hidden,
    #[default]
    Arrow,
    Crosshair,
    IBeam,
    Wait,
    Link,
    Help,
    Forbidden,
    Move,
    SizeNS,
    SizeWE,
    SizeN,
    SizeNE,
    SizeE,
    SizeSE,
    SizeS,
    SizeSW,
    SizeW,
    SizeNW,
}

impl NativeCursor {
    /// Every symbolic cursor, in declaration order.
    pub const ALL: [NativeCursor; 19] = [
        NativeCursor::Hidden,
        NativeCursor::Arrow,
        NativeCursor::Crosshair,
        NativeCursor::IBeam,
        NativeCursor::Wait,
        NativeCursor::Link,
        NativeCursor::Help,
        NativeCursor::Forbidden,
        NativeCursor::Move,
        NativeCursor::SizeNS,
        NativeCursor::SizeWE,
        NativeCursor::SizeN,
        NativeCursor::SizeNE,
        NativeCursor::SizeE,
        NativeCursor::SizeSE,
        NativeCursor::SizeS,
        NativeCursor::SizeSW,
        NativeCursor::SizeW,
        NativeCursor::SizeNW,
    ];
}

/// Interactive window-manager operations started from a pointer event.
///
/// Used by frameless windows that draw their own title bar and borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowAction {
    /// Abort a move/resize in progress.
    Cancel,
    Move,
    ResizeFromTopLeft,
    ResizeFromTop,
    ResizeFromTopRight,
    ResizeFromLeft,
    ResizeFromRight,
    ResizeFromBottomLeft,
    ResizeFromBottom,
    ResizeFromBottomRight,
}

impl WindowAction {
    /// Check if this action resizes the window.
    pub fn is_resize(&self) -> bool {
        !matches!(self, WindowAction::Cancel | WindowAction::Move)
    }
}
