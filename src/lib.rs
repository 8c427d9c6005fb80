//! stratafx is a layered image-effects render engine.
//!
//! A [`RenderEngine`] owns one RGBA frame and a FIFO of jobs:
//!
//! - per-pixel filters and convolution kernels, run block by block on a rayon pool
//! - layers, composited into their parent through a named blend function
//! - plugins and overlay loads, run synchronously between jobs
//!
//! Jobs are queued through the [`FilterQueue`] trait (on the engine, on a layer builder, or from
//! inside a plugin) and nothing touches pixels until [`RenderEngine::render`] drains the queue.
#![forbid(unsafe_code)]

mod foundation;

pub mod analyze;
pub mod assets;
pub mod buffer;
pub mod config;
pub mod effects;
pub mod logging;
pub mod plugin;
pub mod recipe;
pub mod render;

pub use crate::foundation::core::{Dimensions, Pixel, Rgba};
pub use crate::foundation::error::{StrataError, StrataResult};
pub use crate::foundation::math::{
    clamp_channel, clamp_rgb, coordinates_to_location, location_to_coordinates,
};

pub use crate::analyze::Levels;
pub use crate::buffer::PixelBuffer;
pub use crate::config::{EngineConfig, LoggingConfig};
pub use crate::effects::blend::{BlendFn, BlendRegistry, Blended};
pub use crate::effects::composite::{LayerOptions, apply_to_parent};
pub use crate::effects::filters::{ChannelAdjust, ChannelMask};
pub use crate::effects::kernel::Kernel;
pub use crate::plugin::{PluginContext, PluginFn, PluginRegistry};
pub use crate::recipe::{Recipe, Step};
pub use crate::render::engine::RenderEngine;
pub use crate::render::events::{EventKind, RenderEvent};
pub use crate::render::job::{JobInfo, JobKind, LayerId, RenderJob, SingleFilter};
pub use crate::render::layer::LayerBuilder;
pub use crate::render::queue::FilterQueue;
