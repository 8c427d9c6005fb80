use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::buffer::{PixelBuffer, write_rgba};
use crate::config::EngineConfig;
use crate::foundation::core::{Pixel, Rgba};
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::clamp_channel;
use crate::render::events::{EventBus, RenderEvent};
use crate::render::job::{KernelFilter, SingleFilter};

/// A contiguous, pixel-aligned byte range `[start, end)` handled as one unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRange {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl BlockRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `[0, len)` into `blocks` ordered, disjoint ranges of whole pixels.
///
/// Every block gets `floor(pixels / blocks)` pixels; the remainder goes to the last block.
pub fn partition(len: usize, blocks: usize) -> Vec<BlockRange> {
    let blocks = blocks.max(1);
    let pixels = len / 4;
    let block_bytes = (pixels / blocks) * 4;
    let last_bytes = block_bytes + (pixels % blocks) * 4;

    (0..blocks)
        .map(|index| {
            let start = index * block_bytes;
            let end = start
                + if index == blocks - 1 {
                    last_bytes
                } else {
                    block_bytes
                };
            BlockRange { index, start, end }
        })
        .collect()
}

/// Drives one filter or kernel over the blocks of the active buffer.
///
/// Blocks run on a dedicated rayon pool when parallelism is enabled and sequentially otherwise;
/// a job is reported complete only after every block has checked in.
pub struct BlockExecutor {
    blocks: usize,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for BlockExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockExecutor")
            .field("blocks", &self.blocks)
            .field("parallel", &self.pool.is_some())
            .finish()
    }
}

impl BlockExecutor {
    pub fn new(config: &EngineConfig) -> StrataResult<Self> {
        config.validate()?;
        let pool = if config.parallel {
            Some(build_thread_pool(config.threads)?)
        } else {
            None
        };
        Ok(Self {
            blocks: config.blocks,
            pool,
        })
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Apply a per-pixel transform in place, ascending pixel order within each block.
    pub fn run_single(
        &self,
        buffer: &mut PixelBuffer,
        filter: &SingleFilter,
        events: &EventBus,
    ) -> StrataResult<()> {
        let dims = buffer.dimensions();
        let ranges = partition(buffer.len(), self.blocks);
        let apply = &filter.apply;

        self.drive(
            &ranges,
            buffer.as_bytes_mut(),
            events,
            &filter.name,
            |range: &BlockRange, slice: &mut [u8]| {
                for (i, px) in slice.chunks_exact_mut(4).enumerate() {
                    let out = apply(Pixel::read(px, range.start + i * 4, dims));
                    write_rgba(px, out.rgba());
                }
            },
        )
    }

    /// Convolve the buffer with a kernel through a scratch copy, then swap the result in.
    ///
    /// Rows within `half` of the top or bottom edge are outside the kernel's active range and
    /// keep their original values.
    pub fn run_kernel(
        &self,
        buffer: &mut PixelBuffer,
        filter: &KernelFilter,
        events: &EventBus,
    ) -> StrataResult<()> {
        let kernel = &filter.kernel;
        let row_bytes = buffer.dimensions().row_bytes();
        let margin = row_bytes * kernel.half();
        let offsets = kernel.offsets();
        let ranges = partition(buffer.len(), self.blocks);

        let source = buffer.as_bytes();
        let len = source.len();
        let mut scratch = source.to_vec();

        self.drive(
            &ranges,
            &mut scratch,
            events,
            &filter.name,
            |range: &BlockRange, slice: &mut [u8]| {
                let lo = range.start.max(margin);
                let hi = range.end.min(len.saturating_sub(margin));
                let mut samples = vec![[0.0f64; 3]; offsets.len()];
                let mut loc = lo;
                while loc < hi {
                    for (slot, &(dx, dy)) in samples.iter_mut().zip(&offsets) {
                        *slot = sample_relative(source, loc, row_bytes, dx, dy);
                    }
                    let rgb = kernel.apply(&samples);
                    let off = loc - range.start;
                    slice[off] = clamp_channel(rgb[0]);
                    slice[off + 1] = clamp_channel(rgb[1]);
                    slice[off + 2] = clamp_channel(rgb[2]);
                    slice[off + 3] = source[loc + 3];
                    loc += 4;
                }
            },
        )?;

        buffer.replace_data(scratch)
    }

    fn drive<F>(
        &self,
        ranges: &[BlockRange],
        target: &mut [u8],
        events: &EventBus,
        job_name: &str,
        work: F,
    ) -> StrataResult<()>
    where
        F: Fn(&BlockRange, &mut [u8]) + Sync,
    {
        let total = ranges.len();
        let done = AtomicUsize::new(0);
        let slices = split_blocks(target, ranges);

        let run_block = |range: &BlockRange, slice: &mut [u8]| {
            tracing::debug!(
                block = range.index,
                start = range.start,
                end = range.end,
                filter = job_name,
                "block started"
            );
            events.emit(&RenderEvent::BlockStarted {
                block_num: range.index,
                total,
                start_byte: range.start,
                end_byte: range.end,
            });

            work(range, slice);

            let done_count = done.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::debug!(block = range.index, filter = job_name, "block finished");
            events.emit(&RenderEvent::BlockFinished {
                block_num: range.index,
                done_count,
                total,
            });
        };

        match &self.pool {
            Some(pool) => pool.install(|| {
                ranges
                    .par_iter()
                    .zip(slices.into_par_iter())
                    .for_each(|(range, slice)| run_block(range, slice));
            }),
            None => {
                for (range, slice) in ranges.iter().zip(slices) {
                    run_block(range, slice);
                }
            }
        }

        let finished = done.load(Ordering::Acquire);
        if finished != total {
            return Err(StrataError::evaluation(format!(
                "'{job_name}' finished {finished} of {total} blocks"
            )));
        }
        Ok(())
    }
}

fn split_blocks<'a>(mut data: &'a mut [u8], ranges: &[BlockRange]) -> Vec<&'a mut [u8]> {
    let mut out = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(range.len());
        out.push(head);
        data = tail;
    }
    out
}

/// RGB of the pixel `dx` columns right and `dy` rows up from `loc`.
///
/// Only the whole-buffer range is checked: horizontal offsets past a row edge wrap into the
/// neighbouring row. Anything outside the buffer reads as opaque black.
fn sample_relative(src: &[u8], loc: usize, row_bytes: usize, dx: isize, dy: isize) -> [f64; 3] {
    let new_loc = loc as isize - (row_bytes as isize) * dy + 4 * dx;
    if new_loc < 0 || new_loc as usize + 4 > src.len() {
        let black = Rgba::opaque_black();
        return [black.r, black.g, black.b];
    }
    let i = new_loc as usize;
    [f64::from(src[i]), f64::from(src[i + 1]), f64::from(src[i + 2])]
}

fn build_thread_pool(threads: Option<usize>) -> StrataResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("stratafx-block-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StrataError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/executor.rs"]
mod tests;
