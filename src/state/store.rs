use std::collections::HashMap;

use crate::{foundation::core::Frame, motion::field::MotionField};

/// Effect kinds that keep buffers across frames. One slot per kind, not per instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatefulKind {
    Datamosh,
    BlockShoving,
    MotionSmear,
}

/// Cross-frame buffers owned by one stateful effect kind.
///
/// `previous_input` and `accumulation` are always `width * height * 4` bytes. Only the
/// crate mutates them; callers get read-only views.
#[derive(Clone, Debug)]
pub struct ProcessorState {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Raw input of the previous tick.
    pub(crate) previous_input: Vec<u8>,
    /// Mosh / melt buffer: read and written back every tick.
    pub(crate) accumulation: Vec<u8>,
    pub(crate) motion: MotionField,
    /// Highest source-update token already honoured.
    pub(crate) last_update: i64,
}

impl ProcessorState {
    fn seeded(frame: &Frame, last_update: i64) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            previous_input: frame.data().to_vec(),
            accumulation: frame.data().to_vec(),
            motion: MotionField::empty(),
            last_update,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn previous_input(&self) -> &[u8] {
        &self.previous_input
    }

    pub fn accumulation(&self) -> &[u8] {
        &self.accumulation
    }

    pub fn motion(&self) -> &MotionField {
        &self.motion
    }

    pub fn last_update(&self) -> i64 {
        self.last_update
    }
}

/// Result of [`StateStore::get_or_init`].
#[derive(Debug)]
pub enum Slot<'a> {
    /// State was just (re)built from the incoming frame; the caller must pass the frame
    /// through untouched this tick.
    Initialized,
    /// State matches the frame dimensions and is ready for the steady-state algorithm.
    Ready(&'a mut ProcessorState),
}

/// Per-kind processor state, owned by the chain driver.
#[derive(Debug, Default)]
pub struct StateStore {
    slots: HashMap<StatefulKind, ProcessorState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the slot for `kind`, rebuilding it when missing or sized for another
    /// resolution.
    ///
    /// A rebuilt slot is seeded from `frame` (both the previous input and the
    /// accumulation buffer, so the first output is never black), gets an empty motion
    /// field, and adopts `last_update` so an old token does not trigger a reseed.
    pub fn get_or_init(&mut self, kind: StatefulKind, frame: &Frame, last_update: i64) -> Slot<'_> {
        let stale = match self.slots.get(&kind) {
            Some(s) => s.width != frame.width() || s.height != frame.height(),
            None => true,
        };
        if stale {
            tracing::debug!(
                ?kind,
                width = frame.width(),
                height = frame.height(),
                "processor state (re)initialized"
            );
            self.slots
                .insert(kind, ProcessorState::seeded(frame, last_update));
            return Slot::Initialized;
        }
        match self.slots.get_mut(&kind) {
            Some(state) => Slot::Ready(state),
            None => Slot::Initialized,
        }
    }

    pub fn get(&self, kind: StatefulKind) -> Option<&ProcessorState> {
        self.slots.get(&kind)
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, kind: StatefulKind) -> Option<&mut ProcessorState> {
        self.slots.get_mut(&kind)
    }

    /// Drop the slot for `kind`; returns whether one existed.
    pub fn reset(&mut self, kind: StatefulKind) -> bool {
        self.slots.remove(&kind).is_some()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/store.rs"]
mod tests;
