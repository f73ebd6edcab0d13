use super::*;
use crate::{motion::field::MotionVector, state::inject::MediaSources};

fn ctx<'a>(media: &'a MediaSources, timeline: &'a [MediaImage]) -> EffectCtx<'a> {
    EffectCtx {
        time: 0.0,
        media,
        timeline,
        pool: None,
    }
}

fn smear(mode: SmearMode, momentum: f32) -> MotionSmearParams {
    MotionSmearParams {
        mode,
        momentum,
        ..MotionSmearParams::default()
    }
}

fn square_at(x0: u32) -> Frame {
    let mut f = Frame::filled(64, 64, [0, 0, 0, 255], 0.0).unwrap();
    for y in 16..24 {
        for x in x0..x0 + 8 {
            f.set_pixel(x, y, [255, 255, 255, 255]);
        }
    }
    f
}

#[test]
fn bloom_without_sources_passes_through() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = smear(SmearMode::Bloom, 0.5);
    for (i, x0) in [16u32, 24, 32].into_iter().enumerate() {
        let mut f = square_at(x0);
        let before = f.clone();
        let out = apply(&mut f, &p, &mut states, &ctx(&media, &[])).unwrap();
        assert_eq!(out, Applied::PassThrough, "tick {i}");
        assert_eq!(f, before);
    }
    let st = states.get(StatefulKind::MotionSmear).unwrap();
    assert_eq!(st.previous_input, square_at(32).into_data());
    assert!(st.motion.vectors().iter().any(|v| v.dx != 0.0));
}

#[test]
fn bloom_remaps_first_timeline_frame() {
    let media = MediaSources::new();
    let src = MediaImage::new(
        2,
        2,
        vec![
            255, 0, 0, 10, 0, 255, 0, 10, //
            0, 0, 255, 10, 9, 9, 9, 10,
        ],
    )
    .unwrap();
    let timeline = [src];
    let mut states = StateStore::new();
    let p = smear(SmearMode::Bloom, 0.92);

    let input = Frame::filled(4, 4, [50, 50, 50, 255], 0.0).unwrap();
    let mut f0 = input.clone();
    apply(&mut f0, &p, &mut states, &ctx(&media, &timeline)).unwrap();
    let mut f1 = input.clone();
    let out = apply(&mut f1, &p, &mut states, &ctx(&media, &timeline)).unwrap();
    assert_eq!(out, Applied::Rendered);
    assert_eq!(f1.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(f1.pixel(3, 0), [0, 255, 0, 255]);
    assert_eq!(f1.pixel(1, 3), [0, 0, 255, 255]);
    assert_eq!(f1.pixel(2, 2), [9, 9, 9, 255]);
}

#[test]
fn bloom_falls_back_to_uploaded_media() {
    let media: MediaSources = [MediaImage::new(1, 1, vec![1, 2, 3, 4]).unwrap()]
        .into_iter()
        .collect();
    let mut states = StateStore::new();
    let p = smear(SmearMode::Bloom, 0.5);
    let mut f0 = Frame::filled(3, 3, [0, 0, 0, 255], 0.0).unwrap();
    apply(&mut f0, &p, &mut states, &ctx(&media, &[])).unwrap();
    let mut f1 = Frame::filled(3, 3, [0, 0, 0, 255], 1.0).unwrap();
    apply(&mut f1, &p, &mut states, &ctx(&media, &[])).unwrap();
    assert_eq!(f1.pixel(2, 1), [1, 2, 3, 255]);
}

#[test]
fn bloom_skips_empty_timeline_frames() {
    let media: MediaSources = [MediaImage::new(1, 1, vec![1, 2, 3, 4]).unwrap()]
        .into_iter()
        .collect();
    let timeline = [MediaImage::new(0, 0, Vec::new()).unwrap()];
    let mut states = StateStore::new();
    let p = smear(SmearMode::Bloom, 0.5);
    let mut f0 = Frame::filled(3, 3, [0, 0, 0, 255], 0.0).unwrap();
    apply(&mut f0, &p, &mut states, &ctx(&media, &timeline)).unwrap();
    let mut f1 = Frame::filled(3, 3, [0, 0, 0, 255], 1.0).unwrap();
    let out = apply(&mut f1, &p, &mut states, &ctx(&media, &timeline)).unwrap();
    assert_eq!(out, Applied::Rendered);
    assert_eq!(f1.pixel(0, 2), [1, 2, 3, 255]);
}

#[test]
fn melt_blends_live_input_back_in() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = smear(SmearMode::Melt, 0.92);

    let mut f0 = Frame::filled(8, 8, [0, 0, 0, 255], 0.0).unwrap();
    apply(&mut f0, &p, &mut states, &ctx(&media, &[])).unwrap();

    let mut f1 = Frame::filled(8, 8, [255, 255, 255, 255], 1.0).unwrap();
    apply(&mut f1, &p, &mut states, &ctx(&media, &[])).unwrap();
    assert_eq!(f1.pixel(4, 4), [0, 0, 0, 255]);

    // blend_back = 1 - (0.92 * 0.5 + 0.4) = 0.14, so 255 * 0.14 rounds to 36.
    let mut f2 = Frame::filled(8, 8, [255, 255, 255, 255], 2.0).unwrap();
    apply(&mut f2, &p, &mut states, &ctx(&media, &[])).unwrap();
    assert_eq!(f2.pixel(4, 4), [36, 36, 36, 255]);
}

#[test]
fn melt_on_still_input_is_stable() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = MotionSmearParams::default();
    let input = square_at(20);
    for _ in 0..3 {
        let mut f = input.clone();
        apply(&mut f, &p, &mut states, &ctx(&media, &[])).unwrap();
        assert_eq!(f, input);
    }
}

#[test]
fn momentum_controls_field_inertia() {
    let media = MediaSources::new();
    for (momentum, expect) in [(0.0, -8.0), (1.0, 0.0)] {
        let mut states = StateStore::new();
        let p = smear(SmearMode::Melt, momentum);
        let mut f0 = square_at(16);
        apply(&mut f0, &p, &mut states, &ctx(&media, &[])).unwrap();
        let mut f1 = square_at(24);
        apply(&mut f1, &p, &mut states, &ctx(&media, &[])).unwrap();
        let st = states.get(StatefulKind::MotionSmear).unwrap();
        assert_eq!(
            st.motion.vectors()[5],
            MotionVector { dx: expect, dy: 0.0 },
            "momentum {momentum}"
        );
    }
}

#[test]
fn zero_intensity_is_identity() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = MotionSmearParams {
        intensity: 0.0,
        ..MotionSmearParams::default()
    };
    let mut f = square_at(8);
    let before = f.clone();
    assert_eq!(
        apply(&mut f, &p, &mut states, &ctx(&media, &[])).unwrap(),
        Applied::Skipped
    );
    assert_eq!(f, before);
    assert!(states.is_empty());
}
