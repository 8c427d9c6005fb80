use std::sync::Mutex;

use super::*;
use crate::assets::overlay::InMemoryOverlays;
use crate::render::job::{JobInfo, JobKind};

fn engine(pixels: &[[u8; 4]], width: u32, height: u32) -> RenderEngine {
    let frame = PixelBuffer::from_pixels(width, height, pixels).unwrap();
    RenderEngine::new(frame, EngineConfig::sequential(2)).unwrap()
}

fn completed(engine: &mut RenderEngine) -> Arc<Mutex<Vec<JobInfo>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.listen(EventKind::ProcessComplete, move |e| {
        if let RenderEvent::ProcessComplete(info) = e {
            sink.lock().unwrap().push(info.clone());
        }
    });
    seen
}

#[test]
fn pop_without_layer_fails_and_skips_completion() {
    let mut e = engine(&[[1, 2, 3, 255]], 1, 1);
    e.enqueue(RenderJob::LayerPop);
    e.invert();

    let mut called = false;
    let err = e.execute(|_| called = true).unwrap_err();
    assert!(!called);
    assert!(matches!(err, StrataError::Job { .. }));
    assert!(err.to_string().starts_with("layer pop failed"));
    assert_eq!(e.pending(), 0);
    assert_eq!(e.frame().pixel_at(0), Some([1, 2, 3, 255]));
}

#[test]
fn layer_left_open_is_an_error() {
    let mut e = engine(&[[1, 2, 3, 255]], 1, 1);
    let id = e.layer_ids().next_id();
    e.enqueue(RenderJob::LayerPush(crate::render::job::LayerSpec {
        id,
        options: Default::default(),
        content: Default::default(),
    }));
    let err = e.execute(|_| {}).unwrap_err();
    assert!(matches!(err, StrataError::Evaluation(_)));
}

#[test]
fn jobs_complete_in_enqueue_order() {
    let mut e = engine(&[[10, 10, 10, 255]; 6], 3, 2);
    let seen = completed(&mut e);
    e.brightness(10.0);
    e.new_layer(|l| {
        l.copy_parent().invert();
        Ok(())
    })
    .unwrap();
    e.box_blur().unwrap();
    e.execute(|_| {}).unwrap();

    let kinds: Vec<JobKind> = seen.lock().unwrap().iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            JobKind::Single,
            JobKind::LayerPush,
            JobKind::Single,
            JobKind::LayerPop,
            JobKind::Kernel
        ]
    );
}

#[test]
fn plugin_continuations_run_after_queued_jobs() {
    let mut e = engine(&[[100, 100, 100, 255]], 1, 1);
    e.plugins_mut().register("later", |ctx, _args| {
        ctx.process("from-plugin", |mut px| {
            px.r = 7.0;
            px
        });
        Ok(())
    });
    let seen = completed(&mut e);
    e.process_plugin("later", Vec::new());
    e.process("queued", |mut px| {
        px.r = 3.0;
        px
    });

    let mut out = None;
    e.execute(|frame| out = frame.pixel_at(0)).unwrap();

    let names: Vec<String> = seen.lock().unwrap().iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, vec!["later", "queued", "from-plugin"]);
    assert_eq!(out, Some([7, 100, 100, 255]));
}

#[test]
fn unknown_plugin_is_fatal() {
    let mut e = engine(&[[0, 0, 0, 255]], 1, 1);
    e.process_plugin("nope", Vec::new());
    let err = e.execute(|_| {}).unwrap_err();
    assert!(matches!(err.root(), StrataError::UnknownPlugin(name) if name == "nope"));
}

#[test]
fn plugin_errors_carry_plugin_name() {
    let mut e = engine(&[[0, 0, 0, 255]], 1, 1);
    e.plugins_mut()
        .register("broken", |_ctx, _args| anyhow::bail!("out of ink"));
    e.process_plugin("broken", Vec::new());
    let err = e.execute(|_| {}).unwrap_err();
    assert!(matches!(err.root(), StrataError::Plugin { name, .. } if name == "broken"));
    assert!(err.to_string().contains("out of ink"));
}

#[test]
fn overlay_is_loaded_into_its_layer() {
    let mut overlays = InMemoryOverlays::new();
    overlays.insert(
        "stripes",
        PixelBuffer::from_pixels(2, 1, &[[255, 0, 0, 255], [0, 0, 255, 255]]).unwrap(),
    );
    let mut e = engine(&[[50, 50, 50, 255]; 2], 2, 1).with_overlay_fetcher(overlays);
    e.new_layer(|l| {
        l.overlay_image("stripes");
        Ok(())
    })
    .unwrap();
    e.execute(|_| {}).unwrap();
    assert_eq!(e.frame().as_bytes(), &[255, 0, 0, 255, 0, 0, 255, 255]);
}

#[test]
fn missing_overlay_halts_without_compositing() {
    let mut e = engine(&[[50, 50, 50, 255]], 1, 1).with_overlay_fetcher(InMemoryOverlays::new());
    e.new_layer(|l| {
        l.overlay_image("missing");
        Ok(())
    })
    .unwrap();
    let err = e.execute(|_| {}).unwrap_err();
    assert!(matches!(err.root(), StrataError::OverlayFetch { source_name, .. } if source_name == "missing"));
    assert_eq!(e.frame().pixel_at(0), Some([50, 50, 50, 255]));
}

#[test]
fn overlay_for_another_layer_is_rejected() {
    let mut e = engine(&[[0, 0, 0, 255]], 1, 1);
    e.new_layer(|l| {
        l.enqueue(RenderJob::LoadOverlay {
            target: LayerId(999),
            source: "x".to_owned(),
        });
        Ok(())
    })
    .unwrap();
    let err = e.execute(|_| {}).unwrap_err();
    assert!(matches!(err.root(), StrataError::Evaluation(_)));
}

#[test]
fn revert_restores_initial_frame() {
    let mut e = engine(&[[10, 20, 30, 255]], 1, 1);
    e.invert();
    e.execute(|_| {}).unwrap();
    assert_eq!(e.frame().pixel_at(0), Some([245, 235, 225, 255]));
    e.revert().unwrap();
    assert_eq!(e.frame().pixel_at(0), Some([10, 20, 30, 255]));

    let frame = PixelBuffer::from_pixels(1, 1, &[[0, 0, 0, 255]]).unwrap();
    let cfg = EngineConfig {
        allow_revert: false,
        ..EngineConfig::sequential(1)
    };
    let mut fixed = RenderEngine::new(frame, cfg).unwrap();
    assert!(fixed.revert().is_err());
}

#[test]
fn render_emits_start_and_finish_around_completion() {
    let mut e = engine(&[[0, 0, 0, 255]], 1, 1);
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::RenderStart, EventKind::RenderFinished] {
        let log = Arc::clone(&log);
        e.listen(kind, move |ev| log.lock().unwrap().push(ev.kind()));
    }
    e.invert();

    let outer = Arc::clone(&log);
    e.render(move |_| outer.lock().unwrap().push(EventKind::ProcessComplete))
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            EventKind::RenderStart,
            EventKind::RenderFinished,
            EventKind::ProcessComplete
        ]
    );
}

#[test]
fn analyze_reports_current_frame() {
    let e = engine(&[[0, 0, 0, 255], [255, 0, 0, 255]], 2, 1);
    let levels = e.analyze();
    assert_eq!(levels.r[0], 0.5);
    assert_eq!(levels.r[255], 0.5);
    assert_eq!(levels.g[0], 1.0);
}

#[test]
fn invalid_config_is_rejected() {
    let frame = PixelBuffer::from_pixels(1, 1, &[[0, 0, 0, 255]]).unwrap();
    assert!(RenderEngine::new(frame, EngineConfig::sequential(0)).is_err());
}
