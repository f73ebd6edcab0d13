use super::*;
use crate::{motion::field::MotionVector, state::inject::MediaSources};

fn ctx<'a>(media: &'a MediaSources, pool: Option<&'a rayon::ThreadPool>) -> EffectCtx<'a> {
    EffectCtx {
        time: 0.0,
        media,
        timeline: &[],
        pool,
    }
}

fn square_at(x0: u32, y0: u32, alpha: u8) -> Frame {
    let mut f = Frame::filled(64, 64, [0, 0, 0, alpha], 0.0).unwrap();
    for y in y0..y0 + 8 {
        for x in x0..x0 + 8 {
            f.set_pixel(x, y, [255, 255, 255, alpha]);
        }
    }
    f
}

fn textured(w: u32, h: u32, seed: u32) -> Frame {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = ((x * 37 + y * 11 + seed * 5) % 251) as u8;
            data.extend_from_slice(&[v, v.wrapping_mul(3), 255 - v, 255]);
        }
    }
    Frame::new(w, h, data, 0.0).unwrap()
}

#[test]
fn resize_yields_exactly_one_pass_through() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = BlockShovingParams::default();
    let mut outcomes = Vec::new();
    for (w, h) in [(16, 16), (16, 16), (32, 16), (32, 16), (32, 16)] {
        let mut f = textured(w, h, 1);
        outcomes.push(apply(&mut f, &p, &mut states, &ctx(&media, None)).unwrap());
    }
    assert_eq!(
        outcomes,
        vec![
            Applied::PassThrough,
            Applied::Rendered,
            Applied::PassThrough,
            Applied::Rendered,
            Applied::Rendered,
        ]
    );
}

#[test]
fn still_input_is_reproduced() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = BlockShovingParams::default();
    let input = textured(48, 32, 3);
    for _ in 0..3 {
        let mut f = input.clone();
        apply(&mut f, &p, &mut states, &ctx(&media, None)).unwrap();
        assert_eq!(f, input);
    }
}

#[test]
fn moved_square_drags_its_block_vector() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = BlockShovingParams::default();

    let mut f0 = square_at(16, 16, 255);
    apply(&mut f0, &p, &mut states, &ctx(&media, None)).unwrap();
    let mut f1 = square_at(24, 16, 255);
    apply(&mut f1, &p, &mut states, &ctx(&media, None)).unwrap();

    let st = states.get(StatefulKind::BlockShoving).unwrap();
    let grid = st.motion.grid();
    assert_eq!((grid.blocks_x, grid.blocks_y), (4, 4));
    // The raw search points back 8px to where the square came from; the field
    // holds half of it after one 0.5 blend.
    assert_eq!(st.motion.vectors()[5], MotionVector { dx: -4.0, dy: 0.0 });
    assert_eq!(st.motion.vectors()[0], MotionVector::default());
    assert_eq!(st.previous_input, square_at(24, 16, 255).into_data());
}

#[test]
fn block_style_keeps_mosh_alpha_and_fluid_forces_opaque() {
    let media = MediaSources::new();
    for (style, alpha) in [(ShoveStyle::Block, 100u8), (ShoveStyle::Fluid, 255u8)] {
        let mut states = StateStore::new();
        let p = BlockShovingParams {
            style,
            ..BlockShovingParams::default()
        };
        let mut f0 = square_at(16, 16, 100);
        apply(&mut f0, &p, &mut states, &ctx(&media, None)).unwrap();
        let mut f1 = square_at(24, 16, 100);
        apply(&mut f1, &p, &mut states, &ctx(&media, None)).unwrap();
        assert!(f1.data().chunks_exact(4).all(|px| px[3] == alpha), "{style:?}");
    }
}

#[test]
fn zero_intensity_is_identity() {
    let media = MediaSources::new();
    let mut states = StateStore::new();
    let p = BlockShovingParams {
        intensity: 0.0,
        ..BlockShovingParams::default()
    };
    for seed in 0..3 {
        let mut f = textured(20, 20, seed);
        let before = f.clone();
        assert_eq!(
            apply(&mut f, &p, &mut states, &ctx(&media, None)).unwrap(),
            Applied::Skipped
        );
        assert_eq!(f, before);
    }
}

#[test]
fn pooled_search_matches_sequential() {
    let media = MediaSources::new();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .unwrap();
    let p = BlockShovingParams {
        style: ShoveStyle::Fluid,
        intensity: 90.0,
        ..BlockShovingParams::default()
    };
    let mut seq = StateStore::new();
    let mut par = StateStore::new();
    for seed in 0..4 {
        let mut a = textured(40, 24, seed);
        let mut b = a.clone();
        apply(&mut a, &p, &mut seq, &ctx(&media, None)).unwrap();
        apply(&mut b, &p, &mut par, &ctx(&media, Some(&pool))).unwrap();
        assert_eq!(a, b);
    }
}
