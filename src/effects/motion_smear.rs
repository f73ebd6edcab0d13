use crate::{
    effects::{
        Applied, EffectCtx,
        params::{MotionSmearParams, SmearMode},
        search_motion,
    },
    foundation::{
        core::{CHANNELS, Frame, MediaImage},
        error::MoshResult,
        math::{clamp_coord, to_u8_sat},
    },
    motion::{
        estimate::{MatchMetric, SearchParams},
        field::{BlockGrid, MotionField},
    },
    resample::sample::sample_nearest,
    state::{
        inject::inject,
        store::{Slot, StatefulKind, StateStore},
    },
};

const BLOCK_SIZE: u32 = 16;
const SEARCH_RADIUS: u32 = 16;
const SEARCH_STRIDE: u32 = 4;
const SAMPLE_STRIDE: u32 = 4;

/// Smear the picture along a momentum-smoothed motion field.
///
/// `melt` samples a persistent melt buffer and blends the live input back into it at
/// `1 - (momentum * 0.5 + 0.4)` per tick. `bloom` samples the first external frame
/// instead (timeline first, then uploaded media) and passes the input through when
/// there is none. The motion field keeps updating either way.
#[tracing::instrument(level = "trace", skip_all, fields(mode = ?params.mode))]
pub fn apply(
    frame: &mut Frame,
    params: &MotionSmearParams,
    states: &mut StateStore,
    ctx: &EffectCtx<'_>,
) -> MoshResult<Applied> {
    if frame.is_empty() || params.intensity <= 0.0 {
        return Ok(Applied::Skipped);
    }
    let state =
        match states.get_or_init(StatefulKind::MotionSmear, frame, params.source.last_update) {
            Slot::Initialized => return Ok(Applied::PassThrough),
            Slot::Ready(state) => state,
        };

    let (width, height) = (frame.width(), frame.height());
    let search = SearchParams {
        block_size: BLOCK_SIZE,
        radius: SEARCH_RADIUS,
        search_stride: SEARCH_STRIDE,
        sample_stride: SAMPLE_STRIDE,
        metric: MatchMetric::Rgb,
    };
    let raw = search_motion(ctx, frame.data(), &state.previous_input, width, height, &search)?;

    inject(state, params.source, frame.data(), ctx.media);

    state.motion.ensure_grid(BlockGrid::new(width, height, BLOCK_SIZE));
    state.motion.blend_toward(&raw, params.momentum);

    let strength = params.intensity / 100.0;
    let output = match params.mode {
        SmearMode::Melt => {
            let out = melt(&state.accumulation, &state.motion, strength);
            let blend_back = 1.0 - (params.momentum * 0.5 + 0.4);
            for ((m, o), px) in state
                .accumulation
                .chunks_exact_mut(CHANNELS)
                .zip(out.chunks_exact(CHANNELS))
                .zip(frame.data().chunks_exact(CHANNELS))
            {
                for c in 0..3 {
                    m[c] = to_u8_sat(
                        f32::from(o[c]) * (1.0 - blend_back) + f32::from(px[c]) * blend_back,
                    );
                }
            }
            out
        }
        SmearMode::Bloom => {
            let source = ctx
                .timeline
                .iter()
                .chain(ctx.media.iter())
                .find(|img| !img.is_empty());
            match source {
                Some(src) => bloom(src, &state.motion, strength),
                None => {
                    state.previous_input.copy_from_slice(frame.data());
                    return Ok(Applied::PassThrough);
                }
            }
        }
    };

    state.previous_input.copy_from_slice(frame.data());
    frame.data_mut().copy_from_slice(&output);
    Ok(Applied::Rendered)
}

fn melt(melt_buf: &[u8], field: &MotionField, strength: f32) -> Vec<u8> {
    let grid = field.grid();
    let (w, h) = (grid.width, grid.height);
    let mut out = vec![0u8; melt_buf.len()];
    for y in 0..h {
        for x in 0..w {
            let v = field.at_pixel(x, y);
            let sx = x as f32 + v.dx * strength * 2.0;
            let sy = y as f32 + v.dy * strength * 2.0;
            let di = (y as usize * w as usize + x as usize) * CHANNELS;
            for c in 0..3 {
                out[di + c] = sample_nearest(melt_buf, w, h, sx, sy, c);
            }
            out[di + 3] = 255;
        }
    }
    out
}

/// Proportional remap into the source's own resolution, offset by the field.
fn bloom(src: &MediaImage, field: &MotionField, strength: f32) -> Vec<u8> {
    let grid = field.grid();
    let (w, h) = (grid.width, grid.height);
    let mut out = vec![0u8; w as usize * h as usize * CHANNELS];
    for y in 0..h {
        for x in 0..w {
            let v = field.at_pixel(x, y);
            let fx = x as f32 / w as f32 * src.width as f32 + v.dx * strength * 3.0;
            let fy = y as f32 / h as f32 * src.height as f32 + v.dy * strength * 3.0;
            let sx = clamp_coord(fx.floor() as i64, src.width);
            let sy = clamp_coord(fy.floor() as i64, src.height);
            let si = (sy * src.width as usize + sx) * CHANNELS;
            let di = (y as usize * w as usize + x as usize) * CHANNELS;
            if let Some(s) = src.rgba8.get(si..si + 3) {
                out[di..di + 3].copy_from_slice(s);
            }
            out[di + 3] = 255;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/motion_smear.rs"]
mod tests;
