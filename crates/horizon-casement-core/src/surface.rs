//! Pixel surfaces handed to the window shell.
//!
//! The drawing backend owns the real surfaces; the shell only needs to read
//! pixels out of them for window icons and bitmap cursors. [`Surface`] is the
//! narrow view it needs, and [`ImageSurface`] is a simple owned
//! implementation that can be built from raw pixels or loaded from a file.

use std::path::Path;

use thiserror::Error;

/// Channel layout of a 32-bit (or narrower) pixel format.
///
/// Each channel is extracted as `(pixel & mask) >> shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub bits_per_pixel: u32,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    pub alpha_mask: u32,
    pub red_shift: u32,
    pub green_shift: u32,
    pub blue_shift: u32,
    pub alpha_shift: u32,
}

impl SurfaceFormat {
    /// 32-bit `0xAARRGGBB` pixels.
    pub const ARGB32: Self = Self {
        bits_per_pixel: 32,
        red_mask: 0x00ff_0000,
        green_mask: 0x0000_ff00,
        blue_mask: 0x0000_00ff,
        alpha_mask: 0xff00_0000,
        red_shift: 16,
        green_shift: 8,
        blue_shift: 0,
        alpha_shift: 24,
    };

    /// 32-bit `0xAABBGGRR` pixels (RGBA bytes on a little-endian machine).
    pub const ABGR32: Self = Self {
        bits_per_pixel: 32,
        red_mask: 0x0000_00ff,
        green_mask: 0x0000_ff00,
        blue_mask: 0x00ff_0000,
        alpha_mask: 0xff00_0000,
        red_shift: 0,
        green_shift: 8,
        blue_shift: 16,
        alpha_shift: 24,
    };

    /// Split a pixel into `(r, g, b, a)` channel values.
    #[inline]
    pub fn unpack(&self, pixel: u32) -> (u32, u32, u32, u32) {
        (
            (pixel & self.red_mask) >> self.red_shift,
            (pixel & self.green_mask) >> self.green_shift,
            (pixel & self.blue_mask) >> self.blue_shift,
            (pixel & self.alpha_mask) >> self.alpha_shift,
        )
    }

    /// Re-pack a pixel of this format as `0xAARRGGBB`.
    #[inline]
    pub fn to_argb(&self, pixel: u32) -> u32 {
        let (r, g, b, a) = self.unpack(pixel);
        (a << 24) | (r << 16) | (g << 8) | b
    }
}

/// Read-only pixel access to a surface.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Pixel format description.
    fn format(&self) -> SurfaceFormat;
    /// One row of pixels, `width()` entries long.
    fn row(&self, y: u32) -> &[u32];
}

/// Error type for surface construction.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Width or height is zero.
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer size doesn't match the dimensions.
    #[error("expected {expected} pixels, got {actual}")]
    DataSizeMismatch { expected: usize, actual: usize },

    /// Failed to load an image file.
    #[error("failed to load image: {0}")]
    LoadFailed(#[from] image::ImageError),
}

/// An owned 32-bit surface.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageSurface {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
    format: SurfaceFormat,
}

impl ImageSurface {
    /// Create a surface from packed pixels in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero, or if the pixel count
    /// doesn't match `width * height`.
    pub fn from_pixels(
        pixels: Vec<u32>,
        width: u32,
        height: u32,
        format: SurfaceFormat,
    ) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidDimensions { width, height });
        }

        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(SurfaceError::DataSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            pixels,
            width,
            height,
            format,
        })
    }

    /// Create a surface from raw RGBA bytes (4 bytes per pixel, row-major).
    ///
    /// The pixels are stored as ARGB32.
    pub fn from_rgba(rgba: &[u8], width: u32, height: u32) -> Result<Self, SurfaceError> {
        let expected = (width as usize) * (height as usize);
        if rgba.len() != expected * 4 {
            return Err(SurfaceError::DataSizeMismatch {
                expected,
                actual: rgba.len() / 4,
            });
        }

        let pixels = rgba
            .chunks_exact(4)
            .map(|px| {
                (u32::from(px[3]) << 24)
                    | (u32::from(px[0]) << 16)
                    | (u32::from(px[1]) << 8)
                    | u32::from(px[2])
            })
            .collect();

        Self::from_pixels(pixels, width, height, SurfaceFormat::ARGB32)
    }

    /// Load a surface from an image file.
    ///
    /// Supports PNG, JPEG, BMP, ICO, and other formats via the `image` crate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SurfaceError> {
        let img = image::open(path.as_ref())?.into_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(img.as_raw(), width, height)
    }

    /// Create a surface filled with one pixel value.
    pub fn filled(width: u32, height: u32, pixel: u32, format: SurfaceFormat) -> Result<Self, SurfaceError> {
        let count = (width as usize) * (height as usize);
        Self::from_pixels(vec![pixel; count], width, height, format)
    }

    /// Read a single pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
    }
}

impl Surface for ImageSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn row(&self, y: u32) -> &[u32] {
        let w = self.width as usize;
        let start = (y as usize) * w;
        &self.pixels[start..start + w]
    }
}

impl std::fmt::Debug for ImageSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bits_per_pixel", &self.format.bits_per_pixel)
            .finish()
    }
}
