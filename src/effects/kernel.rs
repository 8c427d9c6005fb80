use crate::foundation::error::{StrataError, StrataResult};

/// A validated square convolution kernel.
///
/// Weights are indexed positionally against [`Kernel::offsets`]: the outer loop walks the
/// horizontal offset from `-half` to `+half`, the inner loop walks the vertical offset from
/// `+half` (visually up) down to `-half`.
///
/// Deserialization goes through [`Kernel::new`], so a decoded kernel is always square.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "KernelRepr", into = "KernelRepr")]
pub struct Kernel {
    weights: Vec<f64>,
    side: usize,
    divisor: f64,
    bias: f64,
}

/// Wire form of a [`Kernel`]: the side is derived, never stored.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct KernelRepr {
    weights: Vec<f64>,
    #[serde(default)]
    divisor: Option<f64>,
    #[serde(default)]
    bias: f64,
}

impl TryFrom<KernelRepr> for Kernel {
    type Error = StrataError;

    fn try_from(repr: KernelRepr) -> StrataResult<Self> {
        Self::new(repr.weights, repr.divisor, repr.bias)
    }
}

impl From<Kernel> for KernelRepr {
    fn from(kernel: Kernel) -> Self {
        Self {
            weights: kernel.weights,
            divisor: Some(kernel.divisor),
            bias: kernel.bias,
        }
    }
}

impl Kernel {
    /// Build a kernel; `divisor` defaults to the sum of the weights.
    ///
    /// A zero-sum kernel keeps a divisor of `0`. The resulting infinities and NaNs are clamped
    /// when written back, never reported as errors.
    pub fn new(weights: Vec<f64>, divisor: Option<f64>, bias: f64) -> StrataResult<Self> {
        let side = square_side(weights.len())?;
        let divisor = divisor.unwrap_or_else(|| weights.iter().sum());
        Ok(Self {
            weights,
            side,
            divisor,
            bias,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// `(side - 1) / 2`, the number of rows/columns sampled on each side of the center.
    pub fn half(&self) -> usize {
        (self.side - 1) / 2
    }

    pub fn divisor(&self) -> f64 {
        self.divisor
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// `(horizontal, vertical)` sample offsets in weight order. Positive vertical is up.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let half = self.half() as isize;
        let mut out = Vec::with_capacity(self.weights.len());
        for j in -half..=half {
            for k in (-half..=half).rev() {
                out.push((j, k));
            }
        }
        out
    }

    /// Weighted RGB sum over `samples` (same order as [`Kernel::offsets`]).
    pub fn apply(&self, samples: &[[f64; 3]]) -> [f64; 3] {
        convolve(&self.weights, samples, self.divisor, self.bias)
    }
}

fn square_side(len: usize) -> StrataResult<usize> {
    if len == 0 {
        return Err(StrataError::validation("kernel must have at least one weight"));
    }
    let side = (len as f64).sqrt().round() as usize;
    if side * side != len {
        return Err(StrataError::validation(format!(
            "kernel weight count {len} is not a perfect square"
        )));
    }
    if side % 2 == 0 {
        return Err(StrataError::validation(format!(
            "kernel side {side} must be odd"
        )));
    }
    Ok(side)
}

/// `sum(weights[i] * samples[i]) / divisor + bias` per channel, unclamped.
pub fn convolve(weights: &[f64], samples: &[[f64; 3]], divisor: f64, bias: f64) -> [f64; 3] {
    let mut acc = [0.0f64; 3];
    for (w, s) in weights.iter().zip(samples) {
        for c in 0..3 {
            acc[c] += w * s[c];
        }
    }
    acc.map(|v| v / divisor + bias)
}

/// Kernels shipped with the crate.
pub mod presets {
    use super::Kernel;
    use crate::foundation::error::StrataResult;

    pub fn box_blur() -> StrataResult<Kernel> {
        Kernel::new(vec![1.0; 9], None, 0.0)
    }

    /// `amount` in percent; 100 is a standard 4-neighbour sharpen.
    pub fn sharpen(amount: f64) -> StrataResult<Kernel> {
        let a = amount / 100.0;
        Kernel::new(
            vec![0.0, -a, 0.0, -a, 4.0 * a + 1.0, -a, 0.0, -a, 0.0],
            None,
            0.0,
        )
    }

    pub fn edge_detect() -> StrataResult<Kernel> {
        Kernel::new(
            vec![-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
            None,
            0.0,
        )
    }

    pub fn edge_enhance() -> StrataResult<Kernel> {
        Kernel::new(
            vec![0.0, 0.0, 0.0, -1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            None,
            0.0,
        )
    }

    pub fn emboss() -> StrataResult<Kernel> {
        Kernel::new(
            vec![-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0],
            None,
            0.0,
        )
    }

    pub fn gaussian_blur() -> StrataResult<Kernel> {
        #[rustfmt::skip]
        let weights = vec![
            1.0,  4.0,  6.0,  4.0, 1.0,
            4.0, 16.0, 24.0, 16.0, 4.0,
            6.0, 24.0, 36.0, 24.0, 6.0,
            4.0, 16.0, 24.0, 16.0, 4.0,
            1.0,  4.0,  6.0,  4.0, 1.0,
        ];
        Kernel::new(weights, None, 0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kernel.rs"]
mod tests;
