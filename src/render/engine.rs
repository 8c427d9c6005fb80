use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::analyze::Levels;
use crate::assets::overlay::{FileOverlayFetcher, OverlayFetcher};
use crate::buffer::PixelBuffer;
use crate::config::EngineConfig;
use crate::effects::blend::BlendRegistry;
use crate::foundation::error::{StrataError, StrataResult};
use crate::plugin::{PluginContext, PluginRegistry};
use crate::render::events::{EventBus, EventKind, RenderEvent};
use crate::render::executor::BlockExecutor;
use crate::render::job::{LayerId, LayerIds, RenderJob};
use crate::render::layer::{Layer, active_buffer, active_buffer_mut};
use crate::render::queue::FilterQueue;

/// Owns a frame and the FIFO of jobs to run against it.
///
/// Jobs are queued through [`FilterQueue`] and run strictly in order by [`RenderEngine::execute`]
/// (or [`RenderEngine::render`]). Every job finishes, including all of its blocks, before the
/// next one starts.
pub struct RenderEngine {
    frame: PixelBuffer,
    original: Option<PixelBuffer>,
    queue: VecDeque<RenderJob>,
    layers: Vec<Layer>,
    layer_ids: LayerIds,
    blenders: BlendRegistry,
    plugins: PluginRegistry,
    overlays: Arc<dyn OverlayFetcher>,
    events: EventBus,
    executor: BlockExecutor,
    config: EngineConfig,
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("dimensions", &self.frame.dimensions())
            .field("queued", &self.queue.len())
            .field("layers", &self.layers.len())
            .field("blenders", &self.blenders)
            .field("plugins", &self.plugins)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl RenderEngine {
    pub fn new(frame: PixelBuffer, config: EngineConfig) -> StrataResult<Self> {
        let executor = BlockExecutor::new(&config)?;
        let original = config.allow_revert.then(|| frame.clone());
        Ok(Self {
            frame,
            original,
            queue: VecDeque::new(),
            layers: Vec::new(),
            layer_ids: LayerIds::default(),
            blenders: BlendRegistry::default(),
            plugins: PluginRegistry::default(),
            overlays: Arc::new(FileOverlayFetcher::new()),
            events: EventBus::default(),
            executor,
            config,
        })
    }

    pub fn with_blend_registry(mut self, blenders: BlendRegistry) -> Self {
        self.blenders = blenders;
        self
    }

    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_overlay_fetcher(mut self, fetcher: impl OverlayFetcher + 'static) -> Self {
        self.overlays = Arc::new(fetcher);
        self
    }

    pub fn blenders_mut(&mut self) -> &mut BlendRegistry {
        &mut self.blenders
    }

    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// Subscribe to one kind of lifecycle event. Block events may arrive on worker threads.
    pub fn listen<F>(&mut self, kind: EventKind, f: F) -> &mut Self
    where
        F: Fn(&RenderEvent) + Send + Sync + 'static,
    {
        self.events.listen(kind, f);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn into_frame(self) -> PixelBuffer {
        self.frame
    }

    /// Jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Emit `RenderStart`, then [`RenderEngine::execute`].
    pub fn render<F>(&mut self, on_complete: F) -> StrataResult<()>
    where
        F: FnOnce(&PixelBuffer),
    {
        tracing::info!(
            jobs = self.queue.len(),
            blocks = self.executor.blocks(),
            width = self.frame.width(),
            height = self.frame.height(),
            "render started"
        );
        self.events.emit(&RenderEvent::RenderStart);
        self.execute(on_complete)
    }

    /// Drain the queue, then call `on_complete` once with the finished frame.
    ///
    /// On error the remaining queue and any open layers are discarded, the error is returned,
    /// and `on_complete` is not called. The frame keeps whatever earlier jobs wrote.
    #[tracing::instrument(level = "debug", skip_all, fields(queued = self.queue.len()))]
    pub fn execute<F>(&mut self, on_complete: F) -> StrataResult<()>
    where
        F: FnOnce(&PixelBuffer),
    {
        let started = Instant::now();
        if let Err(err) = self.drain() {
            tracing::error!(error = %err, "render aborted");
            self.queue.clear();
            self.layers.clear();
            return Err(err);
        }

        self.events.emit(&RenderEvent::RenderFinished);
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render finished"
        );
        on_complete(&self.frame);
        Ok(())
    }

    /// Restore the frame captured when the engine was built, dimensions included.
    pub fn revert(&mut self) -> StrataResult<()> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| StrataError::validation("revert is disabled for this engine"))?;
        self.frame = original.clone();
        self.layers.clear();
        Ok(())
    }

    /// Channel histograms of the current frame.
    pub fn analyze(&self) -> Levels {
        Levels::calculate(&self.frame)
    }

    fn drain(&mut self) -> StrataResult<()> {
        while let Some(job) = self.queue.pop_front() {
            let info = job.info();
            self.events.emit(&RenderEvent::ProcessStart(info.clone()));
            self.run_job(job)
                .map_err(|err| err.in_job(info.to_string()))?;
            self.events.emit(&RenderEvent::ProcessComplete(info));
        }

        if !self.layers.is_empty() {
            return Err(StrataError::evaluation(format!(
                "queue drained with {} layer(s) still open",
                self.layers.len()
            )));
        }
        Ok(())
    }

    fn run_job(&mut self, job: RenderJob) -> StrataResult<()> {
        match job {
            RenderJob::Single(filter) => {
                let buffer = active_buffer_mut(&mut self.frame, &mut self.layers);
                self.executor.run_single(buffer, &filter, &self.events)
            }
            RenderJob::Kernel(filter) => {
                let buffer = active_buffer_mut(&mut self.frame, &mut self.layers);
                self.executor.run_kernel(buffer, &filter, &self.events)
            }
            RenderJob::LayerPush(spec) => {
                let parent = active_buffer(&self.frame, &self.layers);
                let layer = Layer::open(spec, parent)?;
                tracing::debug!(
                    layer = layer.id().0,
                    depth = self.layers.len() + 1,
                    "layer opened"
                );
                self.layers.push(layer);
                Ok(())
            }
            RenderJob::LayerPop => {
                let layer = self
                    .layers
                    .pop()
                    .ok_or_else(|| StrataError::evaluation("layer pop with no open layer"))?;
                tracing::debug!(
                    layer = layer.id().0,
                    blend = %layer.options().blend_mode,
                    opacity = layer.options().opacity,
                    "compositing layer"
                );
                let parent = active_buffer_mut(&mut self.frame, &mut self.layers);
                layer.apply_to_parent(parent, &self.blenders)
            }
            RenderJob::Plugin { name, args } => {
                let plugin = self.plugins.get(&name)?;
                tracing::debug!(plugin = %name, "executing plugin");
                let mut ctx = PluginContext::new(
                    &mut self.frame,
                    &mut self.layers,
                    &mut self.queue,
                    &mut self.layer_ids,
                );
                plugin(&mut ctx, &args).map_err(|reason| StrataError::Plugin {
                    name: name.clone(),
                    reason,
                })?;
                tracing::debug!(plugin = %name, "plugin finished");
                Ok(())
            }
            RenderJob::LoadOverlay { target, source } => self.load_overlay(target, &source),
        }
    }

    fn load_overlay(&mut self, target: LayerId, source: &str) -> StrataResult<()> {
        let layer = self.layers.last_mut().ok_or_else(|| {
            StrataError::evaluation(format!("overlay '{source}' loaded with no open layer"))
        })?;
        if layer.id() != target {
            return Err(StrataError::evaluation(format!(
                "overlay '{source}' targets layer #{} but layer #{} is current",
                target.0,
                layer.id().0
            )));
        }

        let dims = layer.buffer().dimensions();
        let fetched = self
            .overlays
            .fetch(source, dims)
            .map_err(|e| StrataError::overlay_fetch(source, format!("{e:#}")))?;
        if fetched.dimensions() != dims {
            return Err(StrataError::overlay_fetch(
                source,
                format!(
                    "fetched {}x{} image for a {}x{} layer",
                    fetched.width(),
                    fetched.height(),
                    dims.width,
                    dims.height
                ),
            ));
        }
        layer.buffer_mut().copy_from(&fetched)
    }
}

impl FilterQueue for RenderEngine {
    fn enqueue(&mut self, job: RenderJob) -> &mut Self {
        self.queue.push_back(job);
        self
    }

    fn layer_ids(&mut self) -> &mut LayerIds {
        &mut self.layer_ids
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
