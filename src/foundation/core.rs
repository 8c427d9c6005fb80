use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::location_to_coordinates;

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create validated dimensions; both sides must be non-zero.
    pub fn new(width: u32, height: u32) -> StrataResult<Self> {
        if width == 0 || height == 0 {
            return Err(StrataError::validation(
                "dimensions must be non-zero in both axes",
            ));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Length in bytes of an RGBA8 buffer with these dimensions.
    pub fn byte_len(self) -> StrataResult<usize> {
        self.pixel_count()
            .checked_mul(4)
            .ok_or_else(|| StrataError::validation("pixel buffer size overflow"))
    }

    /// Bytes in one row.
    pub fn row_bytes(self) -> usize {
        (self.width as usize) * 4
    }
}

/// Straight-alpha RGBA color with floating point channels.
///
/// Channel math is carried out in `f64` and only clamped when written back into a buffer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black, the value sampled for out-of-range kernel neighbors.
    pub const fn opaque_black() -> Self {
        Self::new(0.0, 0.0, 0.0, 255.0)
    }

    pub fn from_bytes(px: &[u8]) -> Self {
        Self::new(
            f64::from(px[0]),
            f64::from(px[1]),
            f64::from(px[2]),
            f64::from(px[3]),
        )
    }
}

/// A mutable view of one pixel handed to single-pixel filters.
///
/// `loc` is the byte offset of the pixel inside the active buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pixel {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
    pub loc: usize,
    dims: Dimensions,
}

impl Pixel {
    pub(crate) fn read(px: &[u8], loc: usize, dims: Dimensions) -> Self {
        Self {
            r: f64::from(px[0]),
            g: f64::from(px[1]),
            b: f64::from(px[2]),
            a: f64::from(px[3]),
            loc,
            dims,
        }
    }

    /// Dimensions of the buffer this pixel belongs to.
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// `(x, y)` with the origin at the top-left corner.
    pub fn coordinates(&self) -> (usize, usize) {
        location_to_coordinates(self.loc, self.dims.width as usize)
    }

    /// `(x, y)` with the origin at the bottom-left corner, like a regular cartesian plot.
    pub fn location_xy(&self) -> (usize, usize) {
        let (x, y) = self.coordinates();
        (x, self.dims.height as usize - y)
    }

    pub fn rgba(&self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, self.a)
    }

    pub fn set_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.r = r;
        self.g = g;
        self.b = b;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
