use crate::foundation::error::{StrataError, StrataResult};

/// Perceptual luminance of an RGB triple (same scale as the input).
pub fn luminance(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// RGB in `[0, 255]` to HSV with every component in `[0, 1]`.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    let s = if max == 0.0 { 0.0 } else { d / max };
    let h = if d == 0.0 {
        0.0
    } else if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, max)
}

/// HSV in `[0, 1]` back to RGB in `[0, 255]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    (r * 255.0, g * 255.0, b * 255.0)
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn hex_to_rgb(hex: &str) -> StrataResult<[u8; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(StrataError::validation(format!(
            "expected a #rrggbb color, got '{hex}'"
        )));
    }
    let mut out = [0u8; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|_| StrataError::validation(format!("invalid hex color '{hex}'")))?;
    }
    Ok(out)
}

/// 256-entry lookup table following the bezier curve through `points` (x, y in `[0, 255]`).
///
/// Values before the first control point hold the first point's `y`, values after the last
/// hold the last point's `y`. Gaps left by the sampling are filled linearly.
pub fn bezier_curve(points: &[[f64; 2]]) -> StrataResult<[u8; 256]> {
    if points.len() < 2 {
        return Err(StrataError::validation(
            "curves need at least two control points",
        ));
    }

    let mut known: [Option<f64>; 256] = [None; 256];
    const STEPS: usize = 1000;
    for i in 0..STEPS {
        let t = i as f64 / STEPS as f64;
        let mut level: Vec<[f64; 2]> = points.to_vec();
        while level.len() > 1 {
            level = level
                .windows(2)
                .map(|w| [lerp(w[0][0], w[1][0], t), lerp(w[0][1], w[1][1], t)])
                .collect();
        }
        let [x, y] = level[0];
        let xi = x.round().clamp(0.0, 255.0) as usize;
        known[xi] = Some(y.clamp(0.0, 255.0).round());
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let end_x = last[0].round().clamp(0.0, 255.0) as usize;
    if known[end_x].is_none() {
        known[end_x] = Some(last[1].clamp(0.0, 255.0));
    }
    fill_missing(&mut known);

    let start_x = first[0].round().clamp(0.0, 255.0) as usize;
    let mut lut = [0u8; 256];
    for (x, slot) in lut.iter_mut().enumerate() {
        let v = if x < start_x {
            first[1]
        } else if x > end_x {
            last[1]
        } else {
            known[x].unwrap_or(0.0)
        };
        *slot = v.clamp(0.0, 255.0).round() as u8;
    }
    Ok(lut)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

fn fill_missing(known: &mut [Option<f64>; 256]) {
    let mut prev: Option<(usize, f64)> = None;
    let mut x = 0;
    while x < known.len() {
        let Some(v) = known[x] else {
            x += 1;
            continue;
        };
        if let Some((px, pv)) = prev {
            let span = (x - px) as f64;
            for (step, slot) in known[px + 1..x].iter_mut().enumerate() {
                let t = (step + 1) as f64 / span;
                *slot = Some(lerp(pv, v, t));
            }
        }
        prev = Some((x, v));
        x += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color.rs"]
mod tests;
