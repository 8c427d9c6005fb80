use crate::buffer::PixelBuffer;
use crate::effects::blend::BlendRegistry;
use crate::effects::composite::{LayerOptions, apply_to_parent};
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::job::{LayerContent, LayerId, LayerIds, LayerSpec, RenderJob};
use crate::render::queue::FilterQueue;

/// An open layer on the engine's stack.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    options: LayerOptions,
    buffer: PixelBuffer,
}

impl Layer {
    /// Materialize a layer described by `spec` on top of `parent`.
    pub(crate) fn open(spec: LayerSpec, parent: &PixelBuffer) -> StrataResult<Self> {
        let buffer = match spec.content {
            LayerContent::Blank => PixelBuffer::blank(parent.dimensions())?,
            LayerContent::CopyParent => parent.clone(),
        };
        Ok(Self {
            id: spec.id,
            options: spec.options,
            buffer,
        })
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    /// Fold this layer into `parent` and drop it.
    pub(crate) fn apply_to_parent(
        self,
        parent: &mut PixelBuffer,
        blenders: &BlendRegistry,
    ) -> StrataResult<()> {
        apply_to_parent(&self.buffer, parent, &self.options, blenders)
    }
}

/// The buffer jobs currently write to: the top layer, or the frame when no layer is open.
pub(crate) fn active_buffer<'b>(frame: &'b PixelBuffer, layers: &'b [Layer]) -> &'b PixelBuffer {
    layers.last().map_or(frame, Layer::buffer)
}

pub(crate) fn active_buffer_mut<'b>(
    frame: &'b mut PixelBuffer,
    layers: &'b mut [Layer],
) -> &'b mut PixelBuffer {
    match layers.last_mut() {
        Some(layer) => layer.buffer_mut(),
        None => frame,
    }
}

/// Collects a layer's settings and jobs while the caller's closure runs.
///
/// Everything queued through the builder lands between the layer's push and pop jobs, in call
/// order. Nested layers come from [`FilterQueue::new_layer`] on the builder itself.
#[derive(Debug)]
pub struct LayerBuilder<'a> {
    id: LayerId,
    ids: &'a mut LayerIds,
    options: LayerOptions,
    content: LayerContent,
    jobs: Vec<RenderJob>,
}

impl<'a> LayerBuilder<'a> {
    pub(crate) fn new(id: LayerId, ids: &'a mut LayerIds) -> Self {
        Self {
            id,
            ids,
            options: LayerOptions::default(),
            content: LayerContent::Blank,
            jobs: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn set_blend_mode(&mut self, mode: impl Into<String>) -> &mut Self {
        self.options.blend_mode = mode.into();
        self
    }

    /// Layer weight in `[0, 1]`; out-of-range values are clamped.
    pub fn set_opacity(&mut self, opacity: f64) -> StrataResult<&mut Self> {
        if !opacity.is_finite() {
            return Err(StrataError::validation(format!(
                "layer opacity must be finite, got {opacity}"
            )));
        }
        let clamped = opacity.clamp(0.0, 1.0);
        if clamped != opacity {
            tracing::warn!(layer = self.id.0, opacity, "layer opacity clamped to [0, 1]");
        }
        self.options.opacity = clamped;
        Ok(self)
    }

    /// Start from a copy of the parent buffer as it is when the layer is pushed.
    pub fn copy_parent(&mut self) -> &mut Self {
        self.content = LayerContent::CopyParent;
        self
    }

    /// Load an external image into this layer when its turn in the queue comes.
    pub fn overlay_image(&mut self, source: impl Into<String>) -> &mut Self {
        let target = self.id;
        self.enqueue(RenderJob::LoadOverlay {
            target,
            source: source.into(),
        })
    }

    /// The full job sequence for this layer: push, queued jobs, pop.
    pub(crate) fn finish(self) -> Vec<RenderJob> {
        let mut out = Vec::with_capacity(self.jobs.len() + 2);
        out.push(RenderJob::LayerPush(LayerSpec {
            id: self.id,
            options: self.options,
            content: self.content,
        }));
        out.extend(self.jobs);
        out.push(RenderJob::LayerPop);
        out
    }
}

impl FilterQueue for LayerBuilder<'_> {
    fn enqueue(&mut self, job: RenderJob) -> &mut Self {
        self.jobs.push(job);
        self
    }

    fn layer_ids(&mut self) -> &mut LayerIds {
        &mut *self.ids
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
