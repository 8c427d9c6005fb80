use super::*;
use crate::effects::blend::Blended;

fn solid(px: [u8; 4], n: usize) -> PixelBuffer {
    PixelBuffer::from_pixels(n as u32, 1, &vec![px; n]).unwrap()
}

fn opts(mode: &str, opacity: f64) -> LayerOptions {
    LayerOptions {
        blend_mode: mode.to_owned(),
        opacity,
    }
}

#[test]
fn half_opacity_normal_over_grey() {
    let layer = solid([255, 0, 0, 255], 1);
    let mut parent = solid([200, 200, 200, 255], 1);
    apply_to_parent(&layer, &mut parent, &opts("normal", 0.5), &BlendRegistry::new()).unwrap();
    assert_eq!(parent.pixel_at(0), Some([228, 100, 100, 255]));
}

#[test]
fn zero_opacity_leaves_parent_for_every_mode() {
    let reg = BlendRegistry::with_builtins();
    let layer = PixelBuffer::from_pixels(3, 1, &[[255, 0, 10, 255], [3, 4, 5, 9], [0, 0, 0, 0]])
        .unwrap();
    let original =
        PixelBuffer::from_pixels(3, 1, &[[10, 20, 30, 40], [200, 100, 0, 255], [1, 2, 3, 4]])
            .unwrap();

    for mode in reg.names() {
        let mut parent = original.clone();
        apply_to_parent(&layer, &mut parent, &opts(mode, 0.0), &reg).unwrap();
        assert_eq!(parent, original, "mode {mode}");
    }
}

#[test]
fn normal_full_opacity_copies_layer_rgb_and_keeps_parent_alpha() {
    let layer = PixelBuffer::from_pixels(2, 1, &[[1, 2, 3, 255], [250, 128, 0, 255]]).unwrap();
    let mut parent = PixelBuffer::from_pixels(2, 1, &[[9, 9, 9, 17], [0, 0, 0, 200]]).unwrap();
    apply_to_parent(&layer, &mut parent, &LayerOptions::default(), &BlendRegistry::new()).unwrap();
    assert_eq!(parent.as_bytes(), &[1, 2, 3, 17, 250, 128, 0, 200]);
}

#[test]
fn transparent_layer_pixels_have_no_effect() {
    let layer = solid([255, 255, 255, 0], 2);
    let mut parent = solid([40, 50, 60, 255], 2);
    let before = parent.clone();
    apply_to_parent(&layer, &mut parent, &opts("normal", 1.0), &BlendRegistry::new()).unwrap();
    assert_eq!(parent, before);
}

#[test]
fn blend_alpha_overrides_layer_alpha() {
    let mut reg = BlendRegistry::new();
    reg.register("half", |l: Rgba, _p: Rgba| Blended {
        r: l.r,
        g: l.g,
        b: l.b,
        a: Some(127.5),
    });
    let layer = solid([255, 255, 255, 255], 1);
    let mut parent = solid([0, 0, 0, 255], 1);
    apply_to_parent(&layer, &mut parent, &opts("half", 1.0), &reg).unwrap();
    assert_eq!(parent.pixel_at(0), Some([128, 128, 128, 255]));
}

#[test]
fn unknown_mode_fails_without_touching_parent() {
    let layer = solid([1, 1, 1, 255], 1);
    let mut parent = solid([2, 2, 2, 255], 1);
    let err =
        apply_to_parent(&layer, &mut parent, &opts("glow", 1.0), &BlendRegistry::new()).unwrap_err();
    assert!(matches!(err, StrataError::UnknownBlendMode(_)));
    assert_eq!(parent.pixel_at(0), Some([2, 2, 2, 255]));
}

#[test]
fn mismatched_dimensions_are_rejected() {
    let layer = solid([1, 1, 1, 255], 2);
    let mut parent = solid([2, 2, 2, 255], 1);
    assert!(
        apply_to_parent(&layer, &mut parent, &LayerOptions::default(), &BlendRegistry::new())
            .is_err()
    );
}
