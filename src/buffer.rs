use crate::foundation::core::{Dimensions, Rgba};
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::{clamp_channel, coordinates_to_location};

/// Owned RGBA8 pixel storage, row-major, straight alpha.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    dims: Dimensions,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A blank canvas: every byte zero (transparent black).
    pub fn blank(dims: Dimensions) -> StrataResult<Self> {
        let len = dims.byte_len()?;
        Ok(Self {
            dims,
            data: vec![0u8; len],
        })
    }

    /// Wrap existing RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> StrataResult<Self> {
        let dims = Dimensions::new(width, height)?;
        if data.len() != dims.byte_len()? {
            return Err(StrataError::validation(format!(
                "pixel data length {} does not match {}x{}x4",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { dims, data })
    }

    /// Build a buffer from per-pixel `[r, g, b, a]` values (test and fixture helper).
    pub fn from_pixels(width: u32, height: u32, pixels: &[[u8; 4]]) -> StrataResult<Self> {
        Self::from_rgba8(width, height, pixels.concat())
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at byte offset `loc`, or `None` when the offset is out of range.
    pub fn pixel_at(&self, loc: usize) -> Option<[u8; 4]> {
        let px = self.data.get(loc..loc.checked_add(4)?)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Pixel at `(x, y)`, top-left origin.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        self.pixel_at(coordinates_to_location(
            x as usize,
            y as usize,
            self.dims.width as usize,
        ))
    }

    /// Write a pixel at `(x, y)`; channels are clamped. Out-of-range writes are rejected.
    pub fn put(&mut self, x: u32, y: u32, rgba: Rgba) -> StrataResult<()> {
        if x >= self.dims.width || y >= self.dims.height {
            return Err(StrataError::validation(format!(
                "pixel ({x}, {y}) outside {}x{} buffer",
                self.dims.width, self.dims.height
            )));
        }
        let loc = coordinates_to_location(x as usize, y as usize, self.dims.width as usize);
        write_rgba(&mut self.data[loc..loc + 4], rgba);
        Ok(())
    }

    /// Fill every pixel with one opaque color.
    pub fn fill(&mut self, rgb: [u8; 3]) {
        for px in self.data.chunks_exact_mut(4) {
            px[..3].copy_from_slice(&rgb);
            px[3] = 255;
        }
    }

    /// Overwrite this buffer's contents with `other`, which must have the same dimensions.
    pub fn copy_from(&mut self, other: &PixelBuffer) -> StrataResult<()> {
        if self.dims != other.dims {
            return Err(StrataError::validation(format!(
                "cannot copy {}x{} pixels into a {}x{} buffer",
                other.dims.width, other.dims.height, self.dims.width, self.dims.height
            )));
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Replace the pixel bytes wholesale; the length must not change.
    pub(crate) fn replace_data(&mut self, data: Vec<u8>) -> StrataResult<()> {
        if data.len() != self.data.len() {
            return Err(StrataError::evaluation(
                "replacement pixel data must keep the buffer length",
            ));
        }
        self.data = data;
        Ok(())
    }

    pub fn to_image(&self) -> StrataResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.dims.width, self.dims.height, self.data.clone())
            .ok_or_else(|| StrataError::evaluation("pixel buffer does not fit an RgbaImage"))
    }

    pub fn from_image(img: image::RgbaImage) -> StrataResult<Self> {
        let (w, h) = img.dimensions();
        Self::from_rgba8(w, h, img.into_raw())
    }
}

pub(crate) fn write_rgba(px: &mut [u8], rgba: Rgba) {
    px[0] = clamp_channel(rgba.r);
    px[1] = clamp_channel(rgba.g);
    px[2] = clamp_channel(rgba.b);
    px[3] = clamp_channel(rgba.a);
}

#[cfg(test)]
#[path = "../tests/unit/buffer.rs"]
mod tests;
