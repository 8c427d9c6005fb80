use std::fmt;
use std::sync::Arc;

use crate::effects::composite::LayerOptions;
use crate::effects::kernel::Kernel;
use crate::foundation::core::Pixel;

/// Per-pixel transform used by single filters. Must be safe to call from any worker thread.
pub type PixelFn = Arc<dyn Fn(Pixel) -> Pixel + Send + Sync>;

/// Identifier of a layer, assigned by the builder that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// Monotonic allocator for [`LayerId`]s, owned by an engine.
#[derive(Clone, Debug, Default)]
pub struct LayerIds {
    next: u64,
}

impl LayerIds {
    pub fn next_id(&mut self) -> LayerId {
        let id = LayerId(self.next);
        self.next += 1;
        id
    }
}

/// How a freshly pushed layer's pixels start out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayerContent {
    /// Transparent black, to be filled by the layer's own jobs.
    #[default]
    Blank,
    /// A copy of the parent buffer as it is when the layer is pushed.
    CopyParent,
}

/// Descriptor produced by a layer builder at enqueue time and consumed by `LayerPush`.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSpec {
    pub id: LayerId,
    pub options: LayerOptions,
    pub content: LayerContent,
}

#[derive(Clone)]
pub struct SingleFilter {
    pub name: String,
    pub apply: PixelFn,
}

impl SingleFilter {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Pixel) -> Pixel + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            apply: Arc::new(f),
        }
    }
}

impl fmt::Debug for SingleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFilter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KernelFilter {
    pub name: String,
    pub kernel: Kernel,
}

/// One queued unit of pipeline work.
#[derive(Clone, Debug)]
pub enum RenderJob {
    Single(SingleFilter),
    Kernel(KernelFilter),
    LayerPush(LayerSpec),
    LayerPop,
    Plugin {
        name: String,
        args: Vec<serde_json::Value>,
    },
    LoadOverlay {
        target: LayerId,
        source: String,
    },
}

/// Discriminant of a [`RenderJob`], carried in events and error context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    Single,
    Kernel,
    LayerPush,
    LayerPop,
    Plugin,
    LoadOverlay,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Single => "filter",
            Self::Kernel => "kernel",
            Self::LayerPush => "layer push",
            Self::LayerPop => "layer pop",
            Self::Plugin => "plugin",
            Self::LoadOverlay => "overlay load",
        };
        f.write_str(s)
    }
}

/// Lightweight description of a job for listeners and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobInfo {
    pub kind: JobKind,
    pub name: String,
}

impl fmt::Display for JobInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} '{}'", self.kind, self.name)
        }
    }
}

impl RenderJob {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Single(_) => JobKind::Single,
            Self::Kernel(_) => JobKind::Kernel,
            Self::LayerPush(_) => JobKind::LayerPush,
            Self::LayerPop => JobKind::LayerPop,
            Self::Plugin { .. } => JobKind::Plugin,
            Self::LoadOverlay { .. } => JobKind::LoadOverlay,
        }
    }

    pub fn info(&self) -> JobInfo {
        let name = match self {
            Self::Single(f) => f.name.clone(),
            Self::Kernel(k) => k.name.clone(),
            Self::LayerPush(spec) => format!("#{}", spec.id.0),
            Self::LayerPop => String::new(),
            Self::Plugin { name, .. } => name.clone(),
            Self::LoadOverlay { source, .. } => source.clone(),
        };
        JobInfo {
            kind: self.kind(),
            name,
        }
    }
}
