use super::*;

fn rgba(r: f64, g: f64, b: f64, a: f64) -> Rgba {
    Rgba::new(r, g, b, a)
}

#[test]
fn new_registry_only_has_normal() {
    let reg = BlendRegistry::new();
    assert_eq!(reg.names().collect::<Vec<_>>(), vec!["normal"]);
    assert!(reg.contains("normal"));
    assert!(!reg.contains("multiply"));
}

#[test]
fn builtins_cover_every_shipped_mode() {
    let reg = BlendRegistry::default();
    for mode in [
        "normal",
        "multiply",
        "screen",
        "overlay",
        "difference",
        "addition",
        "exclusion",
        "softLight",
        "lighten",
        "darken",
    ] {
        assert!(reg.contains(mode), "missing {mode}");
    }
}

#[test]
fn normal_returns_layer_rgb_without_alpha() {
    let out = BlendRegistry::new()
        .execute("normal", rgba(1.0, 2.0, 3.0, 4.0), rgba(9.0, 9.0, 9.0, 9.0))
        .unwrap();
    assert_eq!(out, Blended::rgb(1.0, 2.0, 3.0));
    assert_eq!(out.a, None);
}

#[test]
fn unknown_mode_is_an_error() {
    let err = BlendRegistry::new()
        .execute("glow", rgba(0.0, 0.0, 0.0, 255.0), rgba(0.0, 0.0, 0.0, 255.0))
        .unwrap_err();
    assert!(matches!(err, StrataError::UnknownBlendMode(name) if name == "glow"));
}

#[test]
fn builtin_modes_match_reference_values() {
    let reg = BlendRegistry::with_builtins();
    let layer = rgba(255.0, 0.0, 100.0, 255.0);
    let parent = rgba(200.0, 200.0, 50.0, 255.0);

    let m = reg.execute("multiply", layer, parent).unwrap();
    assert_eq!((m.r, m.g), (200.0, 0.0));

    let s = reg.execute("screen", layer, parent).unwrap();
    assert_eq!((s.r, s.g), (255.0, 200.0));

    let d = reg.execute("difference", layer, parent).unwrap();
    assert_eq!((d.r, d.g, d.b), (55.0, -200.0, 50.0));

    let l = reg.execute("lighten", layer, parent).unwrap();
    assert_eq!((l.r, l.g, l.b), (255.0, 200.0, 100.0));

    let k = reg.execute("darken", layer, parent).unwrap();
    assert_eq!((k.r, k.g, k.b), (200.0, 0.0, 50.0));
}

#[test]
fn register_replaces_existing_mode() {
    let mut reg = BlendRegistry::new();
    reg.register("normal", |_l: Rgba, p: Rgba| Blended {
        r: p.r,
        g: p.g,
        b: p.b,
        a: Some(0.0),
    });
    let out = reg
        .execute("normal", rgba(1.0, 1.0, 1.0, 255.0), rgba(7.0, 8.0, 9.0, 255.0))
        .unwrap();
    assert_eq!(out.a, Some(0.0));
    assert_eq!(out.r, 7.0);
}
