use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::buffer::PixelBuffer;
use crate::foundation::core::Dimensions;

/// Source of images loaded into layers by `LoadOverlay` jobs.
///
/// Contract: the returned buffer must have exactly `dims`; anything else fails the job.
/// A fetch error halts the queue and nothing is composited.
pub trait OverlayFetcher: Send + Sync {
    fn fetch(&self, source: &str, dims: Dimensions) -> anyhow::Result<PixelBuffer>;
}

fn fit(img: image::RgbaImage, dims: Dimensions) -> anyhow::Result<PixelBuffer> {
    let img = if img.dimensions() == (dims.width, dims.height) {
        img
    } else {
        image::imageops::resize(
            &img,
            dims.width,
            dims.height,
            image::imageops::FilterType::Triangle,
        )
    };
    Ok(PixelBuffer::from_image(img)?)
}

/// Decodes overlays from disk and stretches them to the layer size.
///
/// Relative sources resolve against `root` when one is set.
#[derive(Clone, Debug, Default)]
pub struct FileOverlayFetcher {
    root: Option<PathBuf>,
}

impl FileOverlayFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl OverlayFetcher for FileOverlayFetcher {
    fn fetch(&self, source: &str, dims: Dimensions) -> anyhow::Result<PixelBuffer> {
        let path = self.resolve(source);
        tracing::debug!(path = %path.display(), "loading overlay");
        let img = image::open(&path)
            .with_context(|| format!("open overlay '{}'", path.display()))?
            .to_rgba8();
        fit(img, dims)
    }
}

/// Overlays registered up front by name. Useful for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryOverlays {
    images: HashMap<String, PixelBuffer>,
}

impl InMemoryOverlays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, buffer: PixelBuffer) -> &mut Self {
        self.images.insert(source.into(), buffer);
        self
    }
}

impl OverlayFetcher for InMemoryOverlays {
    fn fetch(&self, source: &str, dims: Dimensions) -> anyhow::Result<PixelBuffer> {
        let buffer = self
            .images
            .get(source)
            .with_context(|| format!("no overlay registered as '{source}'"))?;
        if buffer.dimensions() == dims {
            return Ok(buffer.clone());
        }
        fit(buffer.to_image()?, dims)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/overlay.rs"]
mod tests;
