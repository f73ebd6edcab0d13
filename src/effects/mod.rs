//! Per-frame effect processors.
//!
//! Every processor mutates one shared working [`Frame`] in place. Fallible steps (motion
//! search) run before the first write, so an `Err` always leaves the frame untouched.

pub(crate) mod block_shove;
pub(crate) mod datamosh;
pub(crate) mod glitch;
pub(crate) mod motion_smear;
pub(crate) mod params;

use crate::{
    foundation::{core::Frame, core::MediaImage, error::MoshResult},
    motion::estimate::{BlockOffset, SearchParams, estimate, estimate_in},
    state::{inject::MediaSources, store::StateStore},
};
use params::EffectParams;

/// Outcome of running one effect on one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The frame was transformed.
    Rendered,
    /// State was (re)initialized this tick; the frame was left as-is.
    PassThrough,
    /// Nothing to do (zero-area frame, zero intensity, missing optional source, or a kind
    /// rendered elsewhere).
    Skipped,
}

/// Per-tick inputs shared by every effect in a chain.
#[derive(Clone, Copy)]
pub struct EffectCtx<'a> {
    /// Shared time counter; seeds the stateless glitch effects.
    pub time: f64,
    pub media: &'a MediaSources,
    /// External video/timeline frames; the first one feeds motion-smear bloom.
    pub timeline: &'a [MediaImage],
    /// When set, block motion search fans out on this pool.
    pub pool: Option<&'a rayon::ThreadPool>,
}

impl std::fmt::Debug for EffectCtx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectCtx")
            .field("time", &self.time)
            .field("media", &self.media.len())
            .field("timeline", &self.timeline.len())
            .field("parallel", &self.pool.is_some())
            .finish()
    }
}

/// Run the processor matching `params` on `frame`.
pub fn apply_effect(
    frame: &mut Frame,
    params: &EffectParams,
    states: &mut StateStore,
    ctx: &EffectCtx<'_>,
) -> MoshResult<Applied> {
    match params {
        EffectParams::Datamosh(p) => datamosh::apply(frame, p, states, ctx),
        EffectParams::BlockShoving(p) => block_shove::apply(frame, p, states, ctx),
        EffectParams::MotionSmear(p) => motion_smear::apply(frame, p, states, ctx),
        EffectParams::Glitch(p) => Ok(glitch::apply_glitch(frame, p, ctx.time)),
        EffectParams::BlockCorrupt(p) => Ok(glitch::apply_block_corrupt(frame, p, ctx.time)),
        EffectParams::Mesh3d(_) => Ok(Applied::Skipped),
    }
}

fn search_motion(
    ctx: &EffectCtx<'_>,
    current: &[u8],
    reference: &[u8],
    width: u32,
    height: u32,
    params: &SearchParams,
) -> MoshResult<Vec<BlockOffset>> {
    match ctx.pool {
        Some(pool) => estimate_in(pool, current, reference, width, height, params),
        None => estimate(current, reference, width, height, params),
    }
}
