use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn luminance_weights() {
    assert!(close(luminance(255.0, 255.0, 255.0), 255.0));
    assert!(close(luminance(100.0, 0.0, 0.0), 29.9));
}

#[test]
fn hsv_of_primaries() {
    assert_eq!(rgb_to_hsv(255.0, 0.0, 0.0), (0.0, 1.0, 1.0));
    let (h, s, v) = rgb_to_hsv(0.0, 255.0, 0.0);
    assert!(close(h, 1.0 / 3.0) && close(s, 1.0) && close(v, 1.0));
    assert_eq!(rgb_to_hsv(0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
}

#[test]
fn hsv_round_trips() {
    for (r, g, b) in [
        (12.0, 200.0, 90.0),
        (255.0, 255.0, 255.0),
        (30.0, 30.0, 31.0),
        (250.0, 5.0, 120.0),
    ] {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        let (r2, g2, b2) = hsv_to_rgb(h, s, v);
        assert!((r - r2).abs() < 1e-6, "{r} vs {r2}");
        assert!((g - g2).abs() < 1e-6, "{g} vs {g2}");
        assert!((b - b2).abs() < 1e-6, "{b} vs {b2}");
    }
}

#[test]
fn hex_parsing() {
    assert_eq!(hex_to_rgb("#ff8000").unwrap(), [255, 128, 0]);
    assert_eq!(hex_to_rgb("0a0B0c").unwrap(), [10, 11, 12]);
    assert!(hex_to_rgb("#fff").is_err());
    assert!(hex_to_rgb("#gg0000").is_err());
}

#[test]
fn curves_need_two_points() {
    assert!(bezier_curve(&[[0.0, 0.0]]).is_err());
    assert!(bezier_curve(&[]).is_err());
}

#[test]
fn straight_curve_is_identity() {
    let lut = bezier_curve(&[[0.0, 0.0], [255.0, 255.0]]).unwrap();
    for (i, v) in lut.iter().enumerate() {
        assert_eq!(usize::from(*v), i);
    }
}

#[test]
fn curve_is_flat_outside_control_points() {
    let lut = bezier_curve(&[[50.0, 80.0], [200.0, 120.0]]).unwrap();
    assert!(lut[..50].iter().all(|&v| v == 80));
    assert!(lut[201..].iter().all(|&v| v == 120));
    assert_eq!(lut[50], 80);
    assert_eq!(lut[200], 120);
    assert!(lut.windows(2).all(|w| w[0] <= w[1]));
}
