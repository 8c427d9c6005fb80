//! Named plugins invoked from the render queue.
//!
//! A plugin runs synchronously on the engine thread with exclusive access to the active buffer.
//! It may replace the root frame (dimension-changing plugins such as `crop`) and may queue
//! further jobs, which are appended after everything already queued.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use crate::buffer::PixelBuffer;
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::job::{LayerIds, RenderJob};
use crate::render::layer::{Layer, active_buffer, active_buffer_mut};
use crate::render::queue::FilterQueue;

pub type PluginFn =
    Arc<dyn Fn(&mut PluginContext<'_>, &[Value]) -> anyhow::Result<()> + Send + Sync>;

/// What a running plugin may see and touch.
pub struct PluginContext<'a> {
    frame: &'a mut PixelBuffer,
    layers: &'a mut Vec<Layer>,
    queue: &'a mut VecDeque<RenderJob>,
    ids: &'a mut LayerIds,
}

impl<'a> PluginContext<'a> {
    pub(crate) fn new(
        frame: &'a mut PixelBuffer,
        layers: &'a mut Vec<Layer>,
        queue: &'a mut VecDeque<RenderJob>,
        ids: &'a mut LayerIds,
    ) -> Self {
        Self {
            frame,
            layers,
            queue,
            ids,
        }
    }

    /// The active buffer (top layer, or the frame).
    pub fn buffer(&self) -> &PixelBuffer {
        active_buffer(&*self.frame, self.layers.as_slice())
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        active_buffer_mut(&mut *self.frame, self.layers.as_mut_slice())
    }

    /// Number of layers currently open.
    pub fn layer_depth(&self) -> usize {
        self.layers.len()
    }

    /// Swap in a new root frame, possibly with different dimensions.
    ///
    /// Refused while any layer is open: open layers were sized against the current frame.
    pub fn replace_frame(&mut self, frame: PixelBuffer) -> StrataResult<()> {
        if !self.layers.is_empty() {
            return Err(StrataError::evaluation(format!(
                "cannot replace the frame while {} layer(s) are open",
                self.layers.len()
            )));
        }
        *self.frame = frame;
        Ok(())
    }
}

impl fmt::Debug for PluginContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("dimensions", &self.buffer().dimensions())
            .field("layer_depth", &self.layers.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl FilterQueue for PluginContext<'_> {
    fn enqueue(&mut self, job: RenderJob) -> &mut Self {
        self.queue.push_back(job);
        self
    }

    fn layer_ids(&mut self) -> &mut LayerIds {
        &mut *self.ids
    }
}

/// Plugin lookup table owned by an engine.
#[derive(Clone)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, PluginFn>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            plugins: BTreeMap::new(),
        }
    }

    /// `crop` and `resize`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register("crop", crop);
        reg.register("resize", resize);
        reg
    }

    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut PluginContext<'_>, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.plugins.insert(name.into(), Arc::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn get(&self, name: &str) -> StrataResult<PluginFn> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| StrataError::UnknownPlugin(name.to_owned()))
    }
}

fn arg_u32(args: &[Value], idx: usize, what: &str) -> anyhow::Result<Option<u32>> {
    let Some(v) = args.get(idx) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    let n = v
        .as_u64()
        .with_context(|| format!("{what} must be a non-negative integer, got {v}"))?;
    let n = u32::try_from(n).with_context(|| format!("{what} {n} does not fit in u32"))?;
    Ok(Some(n))
}

/// `crop(width, height, x = 0, y = 0)`: keep a `width x height` window of the frame.
fn crop(ctx: &mut PluginContext<'_>, args: &[Value]) -> anyhow::Result<()> {
    let width = arg_u32(args, 0, "crop width")?.context("crop needs a width")?;
    let height = arg_u32(args, 1, "crop height")?.context("crop needs a height")?;
    let x = arg_u32(args, 2, "crop x")?.unwrap_or(0);
    let y = arg_u32(args, 3, "crop y")?.unwrap_or(0);

    let dims = ctx.buffer().dimensions();
    anyhow::ensure!(
        width > 0 && height > 0,
        "crop window must be non-empty, got {width}x{height}"
    );
    anyhow::ensure!(
        u64::from(x) + u64::from(width) <= u64::from(dims.width)
            && u64::from(y) + u64::from(height) <= u64::from(dims.height),
        "crop window {width}x{height}+{x}+{y} exceeds {}x{} frame",
        dims.width,
        dims.height
    );

    let img = ctx.buffer().to_image()?;
    let cropped = image::imageops::crop_imm(&img, x, y, width, height).to_image();
    ctx.replace_frame(PixelBuffer::from_image(cropped)?)?;
    Ok(())
}

#[derive(Debug, Default, serde::Deserialize)]
struct ResizeArgs {
    width: Option<u32>,
    height: Option<u32>,
}

/// `resize({ width?, height? })`: a missing side is derived from the current aspect ratio.
fn resize(ctx: &mut PluginContext<'_>, args: &[Value]) -> anyhow::Result<()> {
    let parsed: ResizeArgs = match args.first() {
        Some(v) if !v.is_null() => {
            serde_json::from_value(v.clone()).context("parse resize dimensions")?
        }
        _ => ResizeArgs::default(),
    };

    let dims = ctx.buffer().dimensions();
    let (w, h) = (f64::from(dims.width), f64::from(dims.height));
    let scaled = |v: f64| v.round().max(1.0) as u32;
    let (width, height) = match (parsed.width, parsed.height) {
        (None, None) => anyhow::bail!("resize needs a width or a height"),
        (Some(nw), Some(nh)) => (nw, nh),
        (Some(nw), None) => (nw, scaled(h * f64::from(nw) / w)),
        (None, Some(nh)) => (scaled(w * f64::from(nh) / h), nh),
    };
    anyhow::ensure!(
        width > 0 && height > 0,
        "resize target must be non-empty, got {width}x{height}"
    );

    let img = ctx.buffer().to_image()?;
    let resized =
        image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
    ctx.replace_frame(PixelBuffer::from_image(resized)?)?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/plugin.rs"]
mod tests;
