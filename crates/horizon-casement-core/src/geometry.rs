//! Integer geometry types shared by every backend.
//!
//! Native window systems report positions and sizes in whole device pixels,
//! so unlike the floating point types used for painting these are all `i32`.
//! Conversions between logical (application) pixels and device pixels go
//! through [`Point::to_logical`], [`Point::to_device`] and friends, which
//! take the window's integer scale factor.

use std::ops::{Add, Sub};

/// A point in 2D integer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Convert device pixels to logical pixels.
    ///
    /// Uses floor division so negative coordinates (pointer outside the
    /// window while captured) keep rounding toward negative infinity.
    #[inline]
    pub fn to_logical(self, scale: i32) -> Self {
        let scale = scale.max(1);
        Self {
            x: self.x.div_euclid(scale),
            y: self.y.div_euclid(scale),
        }
    }

    /// Convert logical pixels to device pixels.
    #[inline]
    pub fn to_device(self, scale: i32) -> Self {
        let scale = scale.max(1);
        Self {
            x: self.x * scale,
            y: self.y * scale,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A size in 2D integer space (width and height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Check if the size has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Convert device pixels to logical pixels.
    #[inline]
    pub fn to_logical(self, scale: i32) -> Self {
        let scale = scale.max(1);
        Self::new(self.width / scale, self.height / scale)
    }

    /// Convert logical pixels to device pixels.
    #[inline]
    pub fn to_device(self, scale: i32) -> Self {
        let scale = scale.max(1);
        Self::new(self.width * scale, self.height * scale)
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self { width, height }
    }
}

/// Thickness of the four edges around a rectangle.
///
/// Used for window decoration insets (the `_NET_FRAME_EXTENTS` of X11): the
/// title bar and borders a window manager adds around the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Border {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Border {
    /// Create a border from its four edges.
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// No border at all.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Sum of the left and right edges.
    #[inline]
    pub fn width(&self) -> i32 {
        self.left + self.right
    }

    /// Sum of the top and bottom edges.
    #[inline]
    pub fn height(&self) -> i32 {
        self.top + self.bottom
    }
}

/// A rectangle defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from an origin point and a size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Empty rectangle at origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Top-left corner.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check whether a point lies inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// Grow the rectangle outward by a border.
    pub fn enlarged(&self, border: Border) -> Self {
        Self::new(
            self.x - border.left,
            self.y - border.top,
            self.width + border.width(),
            self.height + border.height(),
        )
    }

    /// Shrink the rectangle inward by a border.
    pub fn shrunk(&self, border: Border) -> Self {
        Self::new(
            self.x + border.left,
            self.y + border.top,
            self.width - border.width(),
            self.height - border.height(),
        )
    }

    /// Scale every component from logical to device pixels.
    pub fn to_device(&self, scale: i32) -> Self {
        let scale = scale.max(1);
        Self::new(
            self.x * scale,
            self.y * scale,
            self.width * scale,
            self.height * scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_logical_floors() {
        assert_eq!(Point::new(7, 9).to_logical(2), Point::new(3, 4));
        assert_eq!(Point::new(-1, -3).to_logical(2), Point::new(-1, -2));
        assert_eq!(Point::new(5, 5).to_logical(1), Point::new(5, 5));
    }

    #[test]
    fn test_scale_is_clamped() {
        assert_eq!(Point::new(5, 6).to_logical(0), Point::new(5, 6));
        assert_eq!(Size::new(5, 6).to_device(-3), Size::new(5, 6));
    }

    #[test]
    fn test_rect_enlarge_and_shrink() {
        let content = Rect::new(100, 80, 640, 480);
        let insets = Border::new(2, 24, 3, 4);
        let frame = content.enlarged(insets);
        assert_eq!(frame, Rect::new(98, 56, 645, 508));
        assert_eq!(frame.shrunk(insets), content);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(Point::new(0, 0)));
        assert!(rect.contains(Point::new(9, 9)));
        assert!(!rect.contains(Point::new(10, 5)));
    }

    #[test]
    fn test_rect_is_empty() {
        assert!(Rect::ZERO.is_empty());
        assert!(Rect::new(5, 5, 0, 20).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }
}
