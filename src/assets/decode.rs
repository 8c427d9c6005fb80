use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::buffer::PixelBuffer;
use crate::foundation::error::StrataResult;

/// Decode any format `image` understands into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> StrataResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    PixelBuffer::from_image(dyn_img.to_rgba8())
}

/// Encode a buffer in the given container format.
pub fn encode_image(buffer: &PixelBuffer, format: image::ImageFormat) -> StrataResult<Vec<u8>> {
    let mut out = Vec::new();
    buffer
        .to_image()?
        .write_to(&mut Cursor::new(&mut out), format)
        .with_context(|| format!("encode {format:?}"))?;
    Ok(out)
}

/// Read and decode the frame to render.
pub fn load_frame(path: &Path) -> StrataResult<PixelBuffer> {
    let img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    PixelBuffer::from_image(img.to_rgba8())
}

/// Write the rendered frame; the format follows the file extension.
pub fn save_frame(buffer: &PixelBuffer, path: &Path) -> StrataResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory '{}'", parent.display()))?;
        }
    }
    buffer
        .to_image()?
        .save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
