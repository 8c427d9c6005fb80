use serde::Serialize;

use crate::buffer::PixelBuffer;

/// Normalized per-channel histograms: `r[v]` is the share of pixels whose red channel is `v`.
///
/// Each channel's 256 entries sum to 1. Alpha is not counted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Levels {
    pub r: Vec<f64>,
    pub g: Vec<f64>,
    pub b: Vec<f64>,
}

impl Levels {
    pub fn calculate(buffer: &PixelBuffer) -> Self {
        let mut counts = [[0u64; 256]; 3];
        for px in buffer.as_bytes().chunks_exact(4) {
            counts[0][usize::from(px[0])] += 1;
            counts[1][usize::from(px[1])] += 1;
            counts[2][usize::from(px[2])] += 1;
        }

        let pixels = (buffer.len() / 4).max(1) as f64;
        let [r, g, b] =
            counts.map(|c| c.iter().map(|&n| n as f64 / pixels).collect::<Vec<f64>>());
        Self { r, g, b }
    }

    /// Most frequent value per channel, lowest value on ties.
    pub fn peaks(&self) -> [u8; 3] {
        [&self.r, &self.g, &self.b].map(|c| {
            let mut best = 0usize;
            for (v, share) in c.iter().enumerate() {
                if *share > c[best] {
                    best = v;
                }
            }
            best as u8
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/analyze.rs"]
mod tests;
