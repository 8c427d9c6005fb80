use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::foundation::core::Rgba;
use crate::foundation::error::{StrataError, StrataResult};

/// Output of a blend function.
///
/// `a` is optional: when a blender leaves it unset, compositing uses the layer pixel's alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blended {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: Option<f64>,
}

impl Blended {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: None }
    }
}

/// `(layer, parent) -> blended`. Must be pure.
pub type BlendFn = Arc<dyn Fn(Rgba, Rgba) -> Blended + Send + Sync>;

/// Named blend functions used when a layer is composited into its parent.
///
/// Each engine owns its registry; registration is expected before rendering starts.
#[derive(Clone)]
pub struct BlendRegistry {
    blenders: BTreeMap<String, BlendFn>,
}

impl fmt::Debug for BlendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlendRegistry")
            .field("modes", &self.blenders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for BlendRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl BlendRegistry {
    /// A registry containing only `"normal"`.
    pub fn new() -> Self {
        let mut reg = Self {
            blenders: BTreeMap::new(),
        };
        reg.register("normal", normal);
        reg
    }

    /// `"normal"` plus the Photoshop-style modes shipped with the crate.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register("multiply", multiply);
        reg.register("screen", screen);
        reg.register("overlay", overlay);
        reg.register("difference", difference);
        reg.register("addition", addition);
        reg.register("exclusion", exclusion);
        reg.register("softLight", soft_light);
        reg.register("lighten", lighten);
        reg.register("darken", darken);
        reg
    }

    /// Install (or replace) a blender under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Rgba, Rgba) -> Blended + Send + Sync + 'static,
    {
        self.blenders.insert(name.into(), Arc::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blenders.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blenders.keys().map(String::as_str)
    }

    /// Resolve a blender once, for callers that apply it to many pixels.
    pub fn get(&self, name: &str) -> StrataResult<&BlendFn> {
        self.blenders
            .get(name)
            .ok_or_else(|| StrataError::UnknownBlendMode(name.to_owned()))
    }

    pub fn execute(&self, name: &str, layer: Rgba, parent: Rgba) -> StrataResult<Blended> {
        Ok((self.get(name)?)(layer, parent))
    }
}

fn per_channel(layer: Rgba, parent: Rgba, f: impl Fn(f64, f64) -> f64) -> Blended {
    Blended::rgb(
        f(layer.r, parent.r),
        f(layer.g, parent.g),
        f(layer.b, parent.b),
    )
}

fn normal(layer: Rgba, _parent: Rgba) -> Blended {
    Blended::rgb(layer.r, layer.g, layer.b)
}

fn multiply(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, |l, p| l * p / 255.0)
}

fn screen(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, |l, p| {
        255.0 - ((255.0 - l) * (255.0 - p)) / 255.0
    })
}

fn overlay(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, |l, p| {
        if p > 128.0 {
            255.0 - 2.0 * (255.0 - l) * (255.0 - p) / 255.0
        } else {
            p * l * 2.0 / 255.0
        }
    })
}

fn difference(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, |l, p| l - p)
}

fn addition(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, |l, p| p + l)
}

fn exclusion(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, |l, p| {
        128.0 - 2.0 * (p - 128.0) * (l - 128.0) / 255.0
    })
}

fn soft_light(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, |l, p| {
        if p > 128.0 {
            255.0 - ((255.0 - p) * (255.0 - (l - 128.0))) / 255.0
        } else {
            (p * (l + 128.0)) / 255.0
        }
    })
}

fn lighten(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, f64::max)
}

fn darken(layer: Rgba, parent: Rgba) -> Blended {
    per_channel(layer, parent, f64::min)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
