use crate::{
    chain::model::EffectChain,
    effects::{Applied, EffectCtx, apply_effect},
    foundation::{
        core::{Frame, MediaImage},
        error::{MoshError, MoshResult},
    },
    state::{inject::MediaSources, store::StateStore},
};

#[derive(Clone, Debug, Default)]
pub struct ChainDriverOpts {
    /// Fan block motion search out across block rows on a dedicated pool.
    pub parallel_search: bool,
    /// Pool size when `parallel_search` is set; `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// Per-tick effect outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub applied: u32,
    pub pass_through: u32,
    pub skipped: u32,
    /// Effects that failed and left the frame as it was before they ran.
    pub degraded: u32,
}

/// Walks an [`EffectChain`] over one working frame per tick and owns the per-kind
/// processor state.
pub struct ChainDriver {
    states: StateStore,
    pool: Option<rayon::ThreadPool>,
    ticks: u64,
}

impl std::fmt::Debug for ChainDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainDriver")
            .field("states", &self.states.len())
            .field("parallel", &self.pool.is_some())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl ChainDriver {
    pub fn new(opts: &ChainDriverOpts) -> MoshResult<Self> {
        let pool = if opts.parallel_search {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };
        Ok(Self {
            states: StateStore::new(),
            pool,
            ticks: 0,
        })
    }

    /// Run every enabled effect of `chain` on `frame`, in order, in place.
    ///
    /// Never fails: an effect that errors is logged and counted as degraded, and the
    /// frame keeps the pixels it had before that effect.
    #[tracing::instrument(skip(self, frame, chain, media, timeline), fields(
        width = frame.width(),
        height = frame.height(),
        time = frame.timestamp(),
    ))]
    pub fn render(
        &mut self,
        frame: &mut Frame,
        chain: &EffectChain,
        media: &MediaSources,
        timeline: &[MediaImage],
    ) -> RenderStats {
        let ctx = EffectCtx {
            time: frame.timestamp(),
            media,
            timeline,
            pool: self.pool.as_ref(),
        };
        let mut stats = RenderStats::default();
        for inst in chain.iter_enabled() {
            match apply_effect(frame, &inst.params, &mut self.states, &ctx) {
                Ok(Applied::Rendered) => stats.applied += 1,
                Ok(Applied::PassThrough) => stats.pass_through += 1,
                Ok(Applied::Skipped) => stats.skipped += 1,
                Err(e) => {
                    tracing::warn!(
                        id = %inst.id,
                        kind = %inst.kind(),
                        error = %e,
                        "effect failed; frame left unchanged"
                    );
                    stats.degraded += 1;
                }
            }
        }
        self.ticks += 1;
        stats
    }

    /// Number of frames rendered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drop all processor state; the next frame of every stateful effect passes through.
    pub fn reset_state(&mut self) {
        self.states.clear();
    }

    pub fn states(&self) -> &StateStore {
        &self.states
    }
}

fn build_thread_pool(threads: Option<usize>) -> MoshResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MoshError::validation("driver 'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MoshError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/chain/driver.rs"]
mod tests;
