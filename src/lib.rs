//! moshpit is a motion-compensated, stateful glitch-effect core.
//!
//! A [`ChainDriver`] walks an ordered [`EffectChain`] over one working RGBA8 [`Frame`]
//! per tick, mutating it in place. Three effects keep buffers across frames and feed
//! them back into their own output:
//!
//! - **datamosh** integrates the temporal delta of the input into a frozen reference;
//! - **block-shoving** pushes blocks of a feedback buffer along estimated motion;
//! - **motion-smear** drags a melt buffer (or an external frame) along a
//!   momentum-smoothed motion field.
//!
//! Motion comes from a sparse block-matching search ([`estimate`]), sampled with the
//! edge-clamped resamplers in [`sample_nearest`] / [`sample_bilinear`]. Processor state
//! lives in a [`StateStore`], one slot per stateful kind, and is rebuilt whenever the
//! frame size changes; the rebuild tick always passes the frame through untouched.
//!
//! The per-frame path never fails: effects that hit an internal error are logged and
//! leave the frame as it was. Errors surface only at the edges (frame construction,
//! chain documents, image IO, pool configuration).
#![forbid(unsafe_code)]

mod chain;
mod effects;
mod foundation;
mod io;
mod motion;
mod resample;
mod state;

pub use chain::driver::{ChainDriver, ChainDriverOpts, RenderStats};
pub use chain::model::{Direction, EffectChain, EffectInstance};
pub use effects::params::{
    BlockCorruptParams, BlockShovingParams, DatamoshParams, EffectKind, EffectParams,
    GlitchParams, MeshParams, MotionSmearParams, ShoveStyle, SmearMode,
};
pub use effects::{Applied, EffectCtx, apply_effect};
pub use foundation::core::{CHANNELS, Frame, MediaImage, rgba_len};
pub use foundation::error::{MoshError, MoshResult};
pub use foundation::random::{Rng64, noise01, pseudo_random};
pub use io::decode::{decode_image, load_frame, load_image, save_png};
pub use motion::estimate::{BlockOffset, MatchMetric, SearchParams, estimate, estimate_in};
pub use motion::field::{BlockGrid, MotionField, MotionVector};
pub use resample::sample::{sample_bilinear, sample_nearest};
pub use state::inject::{Injection, LIVE_SOURCE, MediaSources, SourceSelect, inject, resample_into};
pub use state::store::{ProcessorState, Slot, StateStore, StatefulKind};
