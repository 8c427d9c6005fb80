use super::*;

#[test]
fn rejects_malformed_weights() {
    assert!(Kernel::new(Vec::new(), None, 0.0).is_err());
    assert!(Kernel::new(vec![1.0; 8], None, 0.0).is_err());
    assert!(Kernel::new(vec![1.0; 4], None, 0.0).is_err());
    assert!(Kernel::new(vec![1.0; 1], None, 0.0).is_ok());
    assert!(Kernel::new(vec![1.0; 25], None, 0.0).is_ok());
}

#[test]
fn divisor_defaults_to_weight_sum() {
    let k = Kernel::new(vec![1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0], None, 0.0).unwrap();
    assert_eq!(k.divisor(), 16.0);
    assert_eq!(k.side(), 3);
    assert_eq!(k.half(), 1);

    let explicit = Kernel::new(vec![1.0; 9], Some(3.0), 5.0).unwrap();
    assert_eq!(explicit.divisor(), 3.0);
    assert_eq!(explicit.bias(), 5.0);
}

#[test]
fn zero_sum_kernel_keeps_zero_divisor() {
    let k = presets::edge_detect().unwrap();
    assert_eq!(k.divisor(), 0.0);
    let out = k.apply(&[[10.0; 3]; 9]);
    assert!(out.iter().all(|v| v.is_nan()));
}

#[test]
fn offsets_walk_columns_then_rows_from_top() {
    let k = Kernel::new(vec![0.0; 9], None, 0.0).unwrap();
    assert_eq!(
        k.offsets(),
        vec![
            (-1, 1),
            (-1, 0),
            (-1, -1),
            (0, 1),
            (0, 0),
            (0, -1),
            (1, 1),
            (1, 0),
            (1, -1),
        ]
    );
}

#[test]
fn convolve_applies_divisor_and_bias() {
    let samples = [[10.0, 20.0, 30.0], [30.0, 40.0, 50.0]];
    assert_eq!(convolve(&[1.0, 1.0], &samples, 2.0, 1.0), [21.0, 31.0, 41.0]);
}

#[test]
fn identity_kernel_returns_center_sample() {
    let mut weights = vec![0.0; 9];
    weights[4] = 1.0;
    let k = Kernel::new(weights, None, 0.0).unwrap();
    let mut samples = [[0.0; 3]; 9];
    samples[4] = [7.0, 8.0, 9.0];
    assert_eq!(k.apply(&samples), [7.0, 8.0, 9.0]);
}

#[test]
fn presets_are_valid() {
    assert_eq!(presets::box_blur().unwrap().divisor(), 9.0);
    assert_eq!(presets::sharpen(100.0).unwrap().divisor(), 1.0);
    assert_eq!(presets::edge_enhance().unwrap().side(), 3);
    assert_eq!(presets::emboss().unwrap().divisor(), 1.0);
    let g = presets::gaussian_blur().unwrap();
    assert_eq!((g.side(), g.divisor()), (5, 256.0));
}

#[test]
fn deserialized_kernel_is_validated() {
    let stored_side =
        serde_json::from_str::<Kernel>(r#"{"weights":[1.0,2.0],"side":0,"divisor":1.0,"bias":0.0}"#);
    assert!(stored_side.is_err());
    assert!(serde_json::from_str::<Kernel>(r#"{"weights":[1.0,2.0]}"#).is_err());
    assert!(serde_json::from_str::<Kernel>(r#"{"weights":[]}"#).is_err());

    let k: Kernel = serde_json::from_str(r#"{"weights":[0,0,0,0,1,0,0,0,0],"bias":2}"#).unwrap();
    assert_eq!(k.side(), 3);
    assert_eq!(k.half(), 1);
    assert_eq!(k.divisor(), 1.0);
    assert_eq!(k.bias(), 2.0);

    let json = serde_json::to_string(&k).unwrap();
    assert!(!json.contains("side"));
    assert_eq!(serde_json::from_str::<Kernel>(&json).unwrap(), k);
}
