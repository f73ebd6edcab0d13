use crate::{
    effects::{
        Applied, EffectCtx,
        params::{BlockShovingParams, ShoveStyle},
        search_motion,
    },
    foundation::{core::Frame, error::MoshResult, math::to_u8_sat},
    motion::{
        estimate::{MatchMetric, SearchParams},
        field::{BlockGrid, MotionField},
    },
    resample::sample::{sample_bilinear, sample_nearest},
    state::{
        inject::inject,
        store::{Slot, StatefulKind, StateStore},
    },
};

const SEARCH_RADIUS: u32 = 16;
const SEARCH_STRIDE: u32 = 8;
const SAMPLE_STRIDE: u32 = 8;
/// Weight kept from the previous motion field each tick.
const FIELD_KEEP: f32 = 0.5;

/// Push blocks of the mosh buffer along the estimated motion, feeding the result back.
///
/// The mosh buffer is both the sampling reference and the sink, so displacements
/// compound over frames. Displacement strength is `intensity / 50`.
#[tracing::instrument(level = "trace", skip_all, fields(style = ?params.style))]
pub fn apply(
    frame: &mut Frame,
    params: &BlockShovingParams,
    states: &mut StateStore,
    ctx: &EffectCtx<'_>,
) -> MoshResult<Applied> {
    if frame.is_empty() || params.intensity <= 0.0 {
        return Ok(Applied::Skipped);
    }
    let state =
        match states.get_or_init(StatefulKind::BlockShoving, frame, params.source.last_update) {
            Slot::Initialized => return Ok(Applied::PassThrough),
            Slot::Ready(state) => state,
        };

    let (width, height) = (frame.width(), frame.height());
    let search = SearchParams {
        block_size: params.block_size,
        radius: SEARCH_RADIUS,
        search_stride: SEARCH_STRIDE,
        sample_stride: SAMPLE_STRIDE,
        metric: MatchMetric::Luma,
    };
    let raw = search_motion(ctx, frame.data(), &state.previous_input, width, height, &search)?;

    inject(state, params.source, frame.data(), ctx.media);

    if state.motion.ensure_grid(BlockGrid::new(width, height, params.block_size)) {
        tracing::debug!(block_size = params.block_size, "block-shoving motion field reset");
    }
    state.motion.blend_toward(&raw, FIELD_KEEP);

    let strength = params.intensity / 50.0;
    let reference = state.accumulation.clone();
    match params.style {
        ShoveStyle::Block => {
            shove_blocks(&reference, &mut state.accumulation, &state.motion, strength)
        }
        ShoveStyle::Fluid => shove_fluid(
            &reference,
            &mut state.accumulation,
            &state.motion.box_smoothed(),
            strength,
        ),
    }

    state.previous_input.copy_from_slice(frame.data());
    frame.data_mut().copy_from_slice(&state.accumulation);
    Ok(Applied::Rendered)
}

/// Nearest sampling at each block's vector; alpha of the mosh buffer is kept.
fn shove_blocks(reference: &[u8], out: &mut [u8], field: &MotionField, strength: f32) {
    let grid = field.grid();
    let (w, h) = (grid.width, grid.height);
    for y in 0..h {
        for x in 0..w {
            let v = field.at_pixel(x, y);
            let sx = x as f32 + v.dx * strength;
            let sy = y as f32 + v.dy * strength;
            let di = (y as usize * w as usize + x as usize) * 4;
            for c in 0..3 {
                out[di + c] = sample_nearest(reference, w, h, sx, sy, c);
            }
        }
    }
}

/// Bilinear sampling along a smoothed, per-pixel interpolated field; alpha forced opaque.
fn shove_fluid(reference: &[u8], out: &mut [u8], smoothed: &MotionField, strength: f32) {
    let grid = smoothed.grid();
    let (w, h) = (grid.width, grid.height);
    for y in 0..h {
        for x in 0..w {
            let v = smoothed.sample_bilinear(x, y);
            let sx = x as f32 + v.dx * strength;
            let sy = y as f32 + v.dy * strength;
            let di = (y as usize * w as usize + x as usize) * 4;
            for c in 0..3 {
                out[di + c] = to_u8_sat(sample_bilinear(reference, w, h, sx, sy, c));
            }
            out[di + 3] = 255;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/block_shove.rs"]
mod tests;
