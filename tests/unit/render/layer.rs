use super::*;
use crate::render::job::JobKind;

fn kinds(jobs: &[RenderJob]) -> Vec<JobKind> {
    jobs.iter().map(RenderJob::kind).collect()
}

#[test]
fn finish_wraps_jobs_in_push_and_pop() {
    let mut ids = LayerIds::default();
    let id = ids.next_id();
    let mut builder = LayerBuilder::new(id, &mut ids);
    builder.set_blend_mode("multiply").copy_parent();
    builder.set_opacity(0.25).unwrap();
    builder.brightness(5.0).invert();

    let jobs = builder.finish();
    assert_eq!(
        kinds(&jobs),
        vec![
            JobKind::LayerPush,
            JobKind::Single,
            JobKind::Single,
            JobKind::LayerPop
        ]
    );
    match &jobs[0] {
        RenderJob::LayerPush(spec) => {
            assert_eq!(spec.id, id);
            assert_eq!(spec.options.blend_mode, "multiply");
            assert_eq!(spec.options.opacity, 0.25);
            assert_eq!(spec.content, LayerContent::CopyParent);
        }
        other => panic!("expected push, got {other:?}"),
    }
}

#[test]
fn opacity_is_clamped_and_must_be_finite() {
    let mut ids = LayerIds::default();
    let id = ids.next_id();
    let mut builder = LayerBuilder::new(id, &mut ids);
    builder.set_opacity(3.0).unwrap();
    assert_eq!(builder.options().opacity, 1.0);
    builder.set_opacity(-1.0).unwrap();
    assert_eq!(builder.options().opacity, 0.0);
    assert!(builder.set_opacity(f64::NAN).is_err());
}

#[test]
fn nested_layers_get_fresh_ids_and_nest_in_order() {
    let mut ids = LayerIds::default();
    let outer = ids.next_id();
    let mut builder = LayerBuilder::new(outer, &mut ids);
    builder.greyscale();
    builder
        .new_layer(|inner| {
            inner.overlay_image("texture.png");
            Ok(())
        })
        .unwrap();

    let jobs = builder.finish();
    assert_eq!(
        kinds(&jobs),
        vec![
            JobKind::LayerPush,
            JobKind::Single,
            JobKind::LayerPush,
            JobKind::LoadOverlay,
            JobKind::LayerPop,
            JobKind::LayerPop,
        ]
    );
    let inner_id = match &jobs[2] {
        RenderJob::LayerPush(spec) => spec.id,
        other => panic!("expected push, got {other:?}"),
    };
    assert_ne!(inner_id, outer);
    match &jobs[3] {
        RenderJob::LoadOverlay { target, source } => {
            assert_eq!(*target, inner_id);
            assert_eq!(source, "texture.png");
        }
        other => panic!("expected overlay, got {other:?}"),
    }
}

#[test]
fn failed_build_queues_nothing() {
    let mut ids = LayerIds::default();
    let outer = ids.next_id();
    let mut builder = LayerBuilder::new(outer, &mut ids);
    let res = builder.new_layer(|inner| {
        inner.invert();
        Err(StrataError::validation("nope"))
    });
    assert!(res.is_err());
    assert_eq!(kinds(&builder.finish()), vec![JobKind::LayerPush, JobKind::LayerPop]);
}

#[test]
fn open_copies_parent_or_starts_blank() {
    let parent = PixelBuffer::from_pixels(2, 1, &[[1, 2, 3, 4], [5, 6, 7, 8]]).unwrap();
    let mut ids = LayerIds::default();

    let copied = Layer::open(
        LayerSpec {
            id: ids.next_id(),
            options: LayerOptions::default(),
            content: LayerContent::CopyParent,
        },
        &parent,
    )
    .unwrap();
    assert_eq!(copied.buffer(), &parent);

    let blank = Layer::open(
        LayerSpec {
            id: ids.next_id(),
            options: LayerOptions::default(),
            content: LayerContent::Blank,
        },
        &parent,
    )
    .unwrap();
    assert_eq!(blank.buffer().dimensions(), parent.dimensions());
    assert!(blank.buffer().as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn active_buffer_is_top_layer_or_frame() {
    let mut frame = PixelBuffer::from_pixels(1, 1, &[[9, 9, 9, 9]]).unwrap();
    let mut layers: Vec<Layer> = Vec::new();
    assert_eq!(active_buffer(&frame, &layers).pixel_at(0), Some([9, 9, 9, 9]));

    let mut ids = LayerIds::default();
    layers.push(
        Layer::open(
            LayerSpec {
                id: ids.next_id(),
                options: LayerOptions::default(),
                content: LayerContent::Blank,
            },
            &frame,
        )
        .unwrap(),
    );
    active_buffer_mut(&mut frame, &mut layers).fill([1, 1, 1]);
    assert_eq!(layers[0].buffer().pixel_at(0), Some([1, 1, 1, 255]));
    assert_eq!(frame.pixel_at(0), Some([9, 9, 9, 9]));
}
