/// Clamp a channel value into `[0, 255]`.
///
/// `NaN` maps to `0`, which is how degenerate kernel divisors and other undefined channel math
/// are resolved.
pub fn clamp_rgb(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 255.0)
}

/// Clamp and round a channel value into a storable byte.
pub fn clamp_channel(v: f64) -> u8 {
    clamp_rgb(v).round() as u8
}

/// Byte offset of pixel `(x, y)` in a row-major RGBA buffer of the given width.
pub fn coordinates_to_location(x: usize, y: usize, width: usize) -> usize {
    (y * width + x) * 4
}

/// Inverse of [`coordinates_to_location`] for pixel-aligned offsets.
pub fn location_to_coordinates(loc: usize, width: usize) -> (usize, usize) {
    let row_bytes = width * 4;
    (loc % row_bytes / 4, loc / row_bytes)
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed ^ Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Deterministic value in `[lo, hi]` derived from `(seed, key)`.
///
/// Stands in for a per-pixel random number. The result depends only on the pixel location, so
/// block scheduling cannot change the output.
pub(crate) fn hashed_range(seed: u64, key: u64, lo: f64, hi: f64) -> f64 {
    let mut h = Fnv1a64::new(seed);
    h.write_u64(key);
    let unit = (h.finish() >> 11) as f64 / (1u64 << 53) as f64;
    lo + (hi - lo) * unit
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
