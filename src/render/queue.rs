use crate::effects::filters::{self, ChannelAdjust, ChannelMask};
use crate::effects::kernel::{Kernel, presets};
use crate::foundation::core::Pixel;
use crate::foundation::error::StrataResult;
use crate::render::job::{KernelFilter, LayerIds, RenderJob, SingleFilter};
use crate::render::layer::LayerBuilder;

/// Anything jobs can be queued on: the engine itself, a layer under construction, or a plugin
/// enqueueing continuation work.
///
/// Only [`FilterQueue::enqueue`] and [`FilterQueue::layer_ids`] are required; every built-in
/// filter, kernel and plugin shortcut is derived from them. Nothing runs until the engine drains.
pub trait FilterQueue {
    /// Append a job at the tail.
    fn enqueue(&mut self, job: RenderJob) -> &mut Self;

    /// Id allocator shared by every layer created through this queue.
    fn layer_ids(&mut self) -> &mut LayerIds;

    /// Queue a custom per-pixel transform.
    fn process<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Pixel) -> Pixel + Send + Sync + 'static,
    {
        self.enqueue(RenderJob::Single(SingleFilter::new(name, f)))
    }

    /// Queue a convolution. `divisor` defaults to the sum of the weights.
    fn process_kernel(
        &mut self,
        name: impl Into<String>,
        weights: Vec<f64>,
        divisor: Option<f64>,
        bias: f64,
    ) -> StrataResult<&mut Self> {
        let kernel = Kernel::new(weights, divisor, bias)?;
        Ok(self.kernel(name, kernel))
    }

    fn kernel(&mut self, name: impl Into<String>, kernel: Kernel) -> &mut Self {
        self.enqueue(RenderJob::Kernel(KernelFilter {
            name: name.into(),
            kernel,
        }))
    }

    /// Queue a call to a registered plugin.
    fn process_plugin(&mut self, name: impl Into<String>, args: Vec<serde_json::Value>) -> &mut Self {
        self.enqueue(RenderJob::Plugin {
            name: name.into(),
            args,
        })
    }

    /// Open a layer; `build` configures it and queues the layer's own jobs.
    ///
    /// If `build` fails nothing is queued.
    fn new_layer<F>(&mut self, build: F) -> StrataResult<&mut Self>
    where
        F: FnOnce(&mut LayerBuilder<'_>) -> StrataResult<()>,
    {
        let jobs = {
            let ids = self.layer_ids();
            let id = ids.next_id();
            let mut builder = LayerBuilder::new(id, ids);
            build(&mut builder)?;
            builder.finish()
        };
        for job in jobs {
            self.enqueue(job);
        }
        Ok(self)
    }

    fn fill_color(&mut self, rgb: [u8; 3]) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::fill_color(rgb)))
    }

    fn brightness(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::brightness(adjust)))
    }

    fn saturation(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::saturation(adjust)))
    }

    fn vibrance(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::vibrance(adjust)))
    }

    fn greyscale(&mut self) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::greyscale()))
    }

    fn contrast(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::contrast(adjust)))
    }

    fn hue(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::hue(adjust)))
    }

    fn colorize(&mut self, rgb: [u8; 3], level: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::colorize(rgb, level)))
    }

    fn invert(&mut self) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::invert()))
    }

    fn sepia(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::sepia(adjust)))
    }

    fn gamma(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::gamma(adjust)))
    }

    fn noise(&mut self, adjust: f64, seed: u64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::noise(adjust, seed)))
    }

    fn clip(&mut self, adjust: f64) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::clip(adjust)))
    }

    fn channels(&mut self, adjust: ChannelAdjust) -> &mut Self {
        self.enqueue(RenderJob::Single(filters::channels(adjust)))
    }

    fn curves(&mut self, mask: ChannelMask, points: &[[f64; 2]]) -> StrataResult<&mut Self> {
        let filter = filters::curves(mask, points)?;
        Ok(self.enqueue(RenderJob::Single(filter)))
    }

    fn exposure(&mut self, adjust: f64) -> StrataResult<&mut Self> {
        let filter = filters::exposure(adjust)?;
        Ok(self.enqueue(RenderJob::Single(filter)))
    }

    fn box_blur(&mut self) -> StrataResult<&mut Self> {
        Ok(self.kernel("boxBlur", presets::box_blur()?))
    }

    fn sharpen(&mut self, amount: f64) -> StrataResult<&mut Self> {
        Ok(self.kernel("sharpen", presets::sharpen(amount)?))
    }

    fn edge_detect(&mut self) -> StrataResult<&mut Self> {
        Ok(self.kernel("edgeDetect", presets::edge_detect()?))
    }

    fn edge_enhance(&mut self) -> StrataResult<&mut Self> {
        Ok(self.kernel("edgeEnhance", presets::edge_enhance()?))
    }

    fn emboss(&mut self) -> StrataResult<&mut Self> {
        Ok(self.kernel("emboss", presets::emboss()?))
    }

    fn gaussian_blur(&mut self) -> StrataResult<&mut Self> {
        Ok(self.kernel("gaussianBlur", presets::gaussian_blur()?))
    }

    /// Queue the built-in `crop` plugin. Only valid on the root frame.
    fn crop(&mut self, width: u32, height: u32, x: u32, y: u32) -> &mut Self {
        self.process_plugin(
            "crop",
            vec![width.into(), height.into(), x.into(), y.into()],
        )
    }

    /// Queue the built-in `resize` plugin; a missing side keeps the aspect ratio.
    fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> &mut Self {
        self.process_plugin(
            "resize",
            vec![serde_json::json!({ "width": width, "height": height })],
        )
    }
}
