//! JSON recipes: a serialized list of steps replayed onto any [`FilterQueue`].
//!
//! ```json
//! {
//!   "config": { "blocks": 8 },
//!   "steps": [
//!     { "op": "brightness", "adjust": 10 },
//!     { "op": "layer", "blend_mode": "multiply", "opacity": 0.6, "fill": "#ff8800",
//!       "steps": [{ "op": "noise", "adjust": 5 }] },
//!     { "op": "sharpen", "amount": 50 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::effects::color::hex_to_rgb;
use crate::effects::filters::{ChannelAdjust, ChannelMask};
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::queue::FilterQueue;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A color given either as `"#rrggbb"` or as `[r, g, b]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Hex(String),
    Rgb([u8; 3]),
}

impl ColorSpec {
    pub fn to_rgb(&self) -> StrataResult<[u8; 3]> {
        match self {
            Self::Hex(hex) => hex_to_rgb(hex),
            Self::Rgb(rgb) => Ok(*rgb),
        }
    }
}

fn default_full() -> f64 {
    100.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_blend_mode() -> String {
    "normal".to_owned()
}

fn default_curve_channels() -> String {
    "rgb".to_owned()
}

fn default_kernel_name() -> String {
    "kernel".to_owned()
}

/// One recipe step, tagged by `op`. Unknown ops fail deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    FillColor {
        color: ColorSpec,
    },
    Brightness {
        adjust: f64,
    },
    Saturation {
        adjust: f64,
    },
    Vibrance {
        adjust: f64,
    },
    Greyscale,
    Contrast {
        adjust: f64,
    },
    Hue {
        adjust: f64,
    },
    Colorize {
        color: ColorSpec,
        level: f64,
    },
    Invert,
    Sepia {
        #[serde(default = "default_full")]
        adjust: f64,
    },
    Gamma {
        adjust: f64,
    },
    Noise {
        adjust: f64,
        #[serde(default)]
        seed: u64,
    },
    Clip {
        adjust: f64,
    },
    Channels {
        #[serde(default)]
        red: Option<f64>,
        #[serde(default)]
        green: Option<f64>,
        #[serde(default)]
        blue: Option<f64>,
    },
    Curves {
        #[serde(default = "default_curve_channels")]
        channels: String,
        points: Vec<[f64; 2]>,
    },
    Exposure {
        adjust: f64,
    },
    Kernel {
        #[serde(default = "default_kernel_name")]
        name: String,
        weights: Vec<f64>,
        #[serde(default)]
        divisor: Option<f64>,
        #[serde(default)]
        bias: f64,
    },
    BoxBlur,
    Sharpen {
        #[serde(default = "default_full")]
        amount: f64,
    },
    EdgeDetect,
    EdgeEnhance,
    Emboss,
    GaussianBlur,
    Plugin {
        name: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
    Crop {
        width: u32,
        height: u32,
        #[serde(default)]
        x: u32,
        #[serde(default)]
        y: u32,
    },
    Resize {
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
    },
    Layer {
        #[serde(default = "default_blend_mode")]
        blend_mode: String,
        #[serde(default = "default_opacity")]
        opacity: f64,
        #[serde(default)]
        copy_parent: bool,
        #[serde(default)]
        fill: Option<ColorSpec>,
        #[serde(default)]
        overlay: Option<String>,
        #[serde(default)]
        steps: Vec<Step>,
    },
}

impl Recipe {
    pub fn from_json(json: &str) -> StrataResult<Self> {
        serde_json::from_str(json).map_err(|e| StrataError::serde(format!("invalid recipe: {e}")))
    }

    pub fn from_path(path: &Path) -> StrataResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StrataError::serde(format!("read recipe '{}': {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Queue every step, in order. Nothing runs until the engine drains.
    pub fn apply<Q: FilterQueue>(&self, queue: &mut Q) -> StrataResult<()> {
        for step in &self.steps {
            step.apply(queue)?;
        }
        Ok(())
    }
}

impl Step {
    pub fn apply<Q: FilterQueue>(&self, q: &mut Q) -> StrataResult<()> {
        match self {
            Self::FillColor { color } => {
                q.fill_color(color.to_rgb()?);
            }
            Self::Brightness { adjust } => {
                q.brightness(*adjust);
            }
            Self::Saturation { adjust } => {
                q.saturation(*adjust);
            }
            Self::Vibrance { adjust } => {
                q.vibrance(*adjust);
            }
            Self::Greyscale => {
                q.greyscale();
            }
            Self::Contrast { adjust } => {
                q.contrast(*adjust);
            }
            Self::Hue { adjust } => {
                q.hue(*adjust);
            }
            Self::Colorize { color, level } => {
                q.colorize(color.to_rgb()?, *level);
            }
            Self::Invert => {
                q.invert();
            }
            Self::Sepia { adjust } => {
                q.sepia(*adjust);
            }
            Self::Gamma { adjust } => {
                q.gamma(*adjust);
            }
            Self::Noise { adjust, seed } => {
                q.noise(*adjust, *seed);
            }
            Self::Clip { adjust } => {
                q.clip(*adjust);
            }
            Self::Channels { red, green, blue } => {
                q.channels(ChannelAdjust {
                    red: *red,
                    green: *green,
                    blue: *blue,
                });
            }
            Self::Curves { channels, points } => {
                q.curves(ChannelMask::from_letters(channels)?, points)?;
            }
            Self::Exposure { adjust } => {
                q.exposure(*adjust)?;
            }
            Self::Kernel {
                name,
                weights,
                divisor,
                bias,
            } => {
                q.process_kernel(name.clone(), weights.clone(), *divisor, *bias)?;
            }
            Self::BoxBlur => {
                q.box_blur()?;
            }
            Self::Sharpen { amount } => {
                q.sharpen(*amount)?;
            }
            Self::EdgeDetect => {
                q.edge_detect()?;
            }
            Self::EdgeEnhance => {
                q.edge_enhance()?;
            }
            Self::Emboss => {
                q.emboss()?;
            }
            Self::GaussianBlur => {
                q.gaussian_blur()?;
            }
            Self::Plugin { name, args } => {
                q.process_plugin(name.clone(), args.clone());
            }
            Self::Crop {
                width,
                height,
                x,
                y,
            } => {
                q.crop(*width, *height, *x, *y);
            }
            Self::Resize { width, height } => {
                q.resize(*width, *height);
            }
            Self::Layer {
                blend_mode,
                opacity,
                copy_parent,
                fill,
                overlay,
                steps,
            } => {
                q.new_layer(|layer| {
                    layer.set_blend_mode(blend_mode.clone());
                    layer.set_opacity(*opacity)?;
                    if *copy_parent {
                        layer.copy_parent();
                    }
                    if let Some(fill) = fill {
                        layer.fill_color(fill.to_rgb()?);
                    }
                    if let Some(source) = overlay {
                        layer.overlay_image(source.clone());
                    }
                    for step in steps {
                        step.apply(layer)?;
                    }
                    Ok(())
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/recipe.rs"]
mod tests;
