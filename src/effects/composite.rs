use crate::buffer::PixelBuffer;
use crate::effects::blend::BlendRegistry;
use crate::foundation::core::Rgba;
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::{clamp_channel, clamp_rgb};

/// Blend mode and opacity applied when a layer is folded into its parent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerOptions {
    /// Name of a blender registered in the engine's [`BlendRegistry`].
    pub blend_mode: String,
    /// Layer weight in `[0, 1]`.
    pub opacity: f64,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            blend_mode: "normal".to_owned(),
            opacity: 1.0,
        }
    }
}

/// Composite `layer` into `parent` in place.
///
/// Each RGB channel moves from the parent value toward the blended value by
/// `opacity * blended_alpha / 255`. The parent's alpha channel is left untouched.
pub fn apply_to_parent(
    layer: &PixelBuffer,
    parent: &mut PixelBuffer,
    opts: &LayerOptions,
    blenders: &BlendRegistry,
) -> StrataResult<()> {
    if layer.dimensions() != parent.dimensions() {
        return Err(StrataError::evaluation(
            "apply_to_parent expects layer and parent buffers with equal dimensions",
        ));
    }
    let blend = blenders.get(&opts.blend_mode)?;
    let opacity = opts.opacity.clamp(0.0, 1.0);

    for (p, l) in parent
        .as_bytes_mut()
        .chunks_exact_mut(4)
        .zip(layer.as_bytes().chunks_exact(4))
    {
        let rgba_layer = Rgba::from_bytes(l);
        let rgba_parent = Rgba::from_bytes(p);
        let result = blend(rgba_layer, rgba_parent);
        let result_rgb = [clamp_rgb(result.r), clamp_rgb(result.g), clamp_rgb(result.b)];
        let result_a = result.a.unwrap_or(rgba_layer.a);
        let weight = opacity * (result_a / 255.0);

        for (c, blended) in result_rgb.into_iter().enumerate() {
            let pc = f64::from(p[c]);
            p[c] = clamp_channel(pc - (pc - blended) * weight);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
