use crate::{
    effects::{Applied, EffectCtx, params::DatamoshParams},
    foundation::{core::Frame, error::MoshResult, math::to_u8_sat},
    state::{
        inject::inject,
        store::{Slot, StatefulKind, StateStore},
    },
};

/// Integrate the temporal delta of each frame into a frozen reference.
///
/// No motion search: per pixel, `mosh += (input - previous_input) * intensity / 100`
/// (RGB only, saturating), and the mosh buffer's RGB becomes the visible output. Alpha
/// of the frame is left alone.
pub fn apply(
    frame: &mut Frame,
    params: &DatamoshParams,
    states: &mut StateStore,
    ctx: &EffectCtx<'_>,
) -> MoshResult<Applied> {
    if frame.is_empty() || params.intensity <= 0.0 {
        return Ok(Applied::Skipped);
    }
    let state = match states.get_or_init(StatefulKind::Datamosh, frame, params.source.last_update)
    {
        Slot::Initialized => return Ok(Applied::PassThrough),
        Slot::Ready(state) => state,
    };

    let injected = inject(state, params.source, frame.data(), ctx.media);
    tracing::trace!(?injected, "datamosh source injection");

    let factor = params.intensity / 100.0;
    let data = frame.data_mut();
    for ((px, prev), mosh) in data
        .chunks_exact_mut(4)
        .zip(state.previous_input.chunks_exact_mut(4))
        .zip(state.accumulation.chunks_exact_mut(4))
    {
        for c in 0..3 {
            let delta = f32::from(px[c]) - f32::from(prev[c]);
            mosh[c] = to_u8_sat(f32::from(mosh[c]) + delta * factor);
        }
        prev.copy_from_slice(px);
        px[..3].copy_from_slice(&mosh[..3]);
    }
    Ok(Applied::Rendered)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/datamosh.rs"]
mod tests;
