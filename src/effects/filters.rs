//! Built-in single-pixel filters.
//!
//! Each constructor precomputes its parameters once and returns a [`SingleFilter`] whose closure
//! only does per-pixel arithmetic. Channel values may leave `[0, 255]`; the executor clamps on
//! write-back.

use serde::{Deserialize, Serialize};

use crate::effects::color::{bezier_curve, hsv_to_rgb, luminance, rgb_to_hsv};
use crate::foundation::core::Pixel;
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::{clamp_channel, hashed_range};
use crate::render::job::SingleFilter;

/// Per-channel intensity adjustments for [`channels`], each in `[-100, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelAdjust {
    pub red: Option<f64>,
    pub green: Option<f64>,
    pub blue: Option<f64>,
}

/// Which RGB channels a curve is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
}

impl ChannelMask {
    pub const RGB: Self = Self {
        r: true,
        g: true,
        b: true,
    };

    /// Parse a channel list such as `"rgb"`, `"r"` or `"gb"`. A leading `v` selects all three.
    pub fn from_letters(letters: &str) -> StrataResult<Self> {
        if letters.starts_with('v') {
            return Ok(Self::RGB);
        }
        let mut mask = Self {
            r: false,
            g: false,
            b: false,
        };
        for c in letters.chars() {
            match c {
                'r' => mask.r = true,
                'g' => mask.g = true,
                'b' => mask.b = true,
                other => {
                    return Err(StrataError::validation(format!(
                        "unknown curve channel '{other}' in '{letters}'"
                    )));
                }
            }
        }
        if !(mask.r || mask.g || mask.b) {
            return Err(StrataError::validation("curves need at least one channel"));
        }
        Ok(mask)
    }
}

fn map_rgb(px: &mut Pixel, f: impl Fn(f64) -> f64) {
    px.set_rgb(f(px.r), f(px.g), f(px.b));
}

/// Replace every pixel with an opaque solid color.
pub fn fill_color(rgb: [u8; 3]) -> SingleFilter {
    let [r, g, b] = rgb.map(f64::from);
    SingleFilter::new("fillColor", move |mut px: Pixel| {
        px.set_rgb(r, g, b);
        px.a = 255.0;
        px
    })
}

/// `adjust` in `[-100, 100]`.
pub fn brightness(adjust: f64) -> SingleFilter {
    let delta = (255.0 * (adjust / 100.0)).floor();
    SingleFilter::new("brightness", move |mut px: Pixel| {
        map_rgb(&mut px, |v| v + delta);
        px
    })
}

/// Push the two non-dominant channels toward (or away from) the dominant one.
fn toward_max(px: &mut Pixel, amount: f64) {
    let max = px.r.max(px.g).max(px.b);
    map_rgb(px, |v| if v != max { v + (max - v) * amount } else { v });
}

/// `adjust` in `[-100, 100]`; negative desaturates.
pub fn saturation(adjust: f64) -> SingleFilter {
    let amount = adjust * -0.01;
    SingleFilter::new("saturation", move |mut px: Pixel| {
        toward_max(&mut px, amount);
        px
    })
}

/// Like [`saturation`] but weighted toward pixels that are less saturated already.
pub fn vibrance(adjust: f64) -> SingleFilter {
    let adjust = -adjust;
    SingleFilter::new("vibrance", move |mut px: Pixel| {
        let max = px.r.max(px.g).max(px.b);
        let avg = (px.r + px.g + px.b) / 3.0;
        let amount = ((max - avg).abs() * 2.0 / 255.0) * adjust / 100.0;
        toward_max(&mut px, amount);
        px
    })
}

pub fn greyscale() -> SingleFilter {
    SingleFilter::new("greyscale", |mut px: Pixel| {
        let l = luminance(px.r, px.g, px.b);
        px.set_rgb(l, l, l);
        px
    })
}

/// `adjust` in `[-100, 100]`. Small values (5-10) already have a strong effect.
pub fn contrast(adjust: f64) -> SingleFilter {
    let factor = ((adjust + 100.0) / 100.0).powi(2);
    SingleFilter::new("contrast", move |mut px: Pixel| {
        map_rgb(&mut px, |v| ((v / 255.0 - 0.5) * factor + 0.5) * 255.0);
        px
    })
}

/// Rotate hue by `adjust` percent of the full circle.
pub fn hue(adjust: f64) -> SingleFilter {
    let shift = adjust.abs();
    SingleFilter::new("hue", move |mut px: Pixel| {
        let (h, s, v) = rgb_to_hsv(px.r, px.g, px.b);
        let h = ((h * 100.0 + shift) % 100.0) / 100.0;
        let (r, g, b) = hsv_to_rgb(h, s, v);
        px.set_rgb(r, g, b);
        px
    })
}

/// Shift every pixel toward `rgb` by `level` percent.
pub fn colorize(rgb: [u8; 3], level: f64) -> SingleFilter {
    let target = rgb.map(f64::from);
    let t = level / 100.0;
    SingleFilter::new("colorize", move |mut px: Pixel| {
        px.set_rgb(
            px.r - (px.r - target[0]) * t,
            px.g - (px.g - target[1]) * t,
            px.b - (px.b - target[2]) * t,
        );
        px
    })
}

pub fn invert() -> SingleFilter {
    SingleFilter::new("invert", |mut px: Pixel| {
        map_rgb(&mut px, |v| 255.0 - v);
        px
    })
}

/// `adjust` in `[0, 100]`, how strongly the sepia tone is applied.
///
/// Channels are updated in order, so green and blue see the already-toned red (and green).
pub fn sepia(adjust: f64) -> SingleFilter {
    let a = adjust / 100.0;
    SingleFilter::new("sepia", move |mut px: Pixel| {
        px.r = (px.r * (1.0 - 0.607 * a) + px.g * (0.769 * a) + px.b * (0.189 * a)).min(255.0);
        px.g = (px.r * (0.349 * a) + px.g * (1.0 - 0.314 * a) + px.b * (0.168 * a)).min(255.0);
        px.b = (px.r * (0.272 * a) + px.g * (0.534 * a) + px.b * (1.0 - 0.869 * a)).min(255.0);
        px
    })
}

/// Values below 1 flatten contrast, values above 1 increase it.
pub fn gamma(adjust: f64) -> SingleFilter {
    SingleFilter::new("gamma", move |mut px: Pixel| {
        map_rgb(&mut px, |v| (v / 255.0).powf(adjust) * 255.0);
        px
    })
}

/// Add the same pseudo-random offset in `[-2.55 * adjust, 2.55 * adjust]` to each channel.
///
/// The offset is a hash of `seed` and the pixel location, so the output does not depend on how
/// the buffer is split into blocks.
pub fn noise(adjust: f64, seed: u64) -> SingleFilter {
    let range = adjust.abs() * 2.55;
    SingleFilter::new("noise", move |mut px: Pixel| {
        let offset = hashed_range(seed, px.loc as u64, -range, range).round();
        map_rgb(&mut px, |v| v + offset);
        px
    })
}

/// Snap channels within `adjust` percent of either end to 0 or 255.
pub fn clip(adjust: f64) -> SingleFilter {
    let edge = adjust.abs() * 2.55;
    SingleFilter::new("clip", move |mut px: Pixel| {
        map_rgb(&mut px, |v| {
            if v > 255.0 - edge {
                255.0
            } else if v < edge {
                0.0
            } else {
                v
            }
        });
        px
    })
}

/// Raise a channel toward 255 for positive values, lower it toward 0 for negative ones.
pub fn channels(adjust: ChannelAdjust) -> SingleFilter {
    let scale = |v: Option<f64>| v.filter(|v| *v != 0.0).map(|v| v / 100.0);
    let (red, green, blue) = (scale(adjust.red), scale(adjust.green), scale(adjust.blue));
    let shift = |v: f64, amount: Option<f64>| match amount {
        Some(a) if a > 0.0 => v + (255.0 - v) * a,
        Some(a) => v - v * a.abs(),
        None => v,
    };
    SingleFilter::new("channels", move |mut px: Pixel| {
        px.set_rgb(shift(px.r, red), shift(px.g, green), shift(px.b, blue));
        px
    })
}

/// Remap the selected channels through a bezier curve defined by at least two control points.
pub fn curves(mask: ChannelMask, points: &[[f64; 2]]) -> StrataResult<SingleFilter> {
    let lut = bezier_curve(points)?;
    let look = move |v: f64| f64::from(lut[usize::from(clamp_channel(v))]);
    Ok(SingleFilter::new("curves", move |mut px: Pixel| {
        if mask.r {
            px.r = look(px.r);
        }
        if mask.g {
            px.g = look(px.g);
        }
        if mask.b {
            px.b = look(px.b);
        }
        px
    }))
}

/// `adjust` in `[-100, 100]`, implemented as an RGB curve.
pub fn exposure(adjust: f64) -> StrataResult<SingleFilter> {
    let p = adjust.abs() / 100.0;
    let (mut c1, mut c2) = ([0.0, 255.0 * p], [255.0 - 255.0 * p, 255.0]);
    if adjust < 0.0 {
        c1.reverse();
        c2.reverse();
    }
    let mut filter = curves(ChannelMask::RGB, &[[0.0, 0.0], c1, c2, [255.0, 255.0]])?;
    filter.name = "exposure".to_owned();
    Ok(filter)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filters.rs"]
mod tests;
