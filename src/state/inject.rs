use crate::{
    foundation::core::{CHANNELS, MediaImage},
    state::store::ProcessorState,
};

/// Index meaning "the live frame" in [`SourceSelect::active_source`].
pub const LIVE_SOURCE: i32 = -1;

/// Which source reseeds the accumulation buffer, and the token that requests it.
///
/// The UI bumps `last_update` whenever the selection changes, media is uploaded or the
/// list is cleared; each strictly larger token triggers exactly one reseed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceSelect {
    pub active_source: i32,
    pub last_update: i64,
}

impl Default for SourceSelect {
    fn default() -> Self {
        Self {
            active_source: LIVE_SOURCE,
            last_update: 0,
        }
    }
}

/// Ordered list of still images owned by the UI layer. The core only reads it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaSources {
    images: Vec<MediaImage>,
}

impl MediaSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an image and return its index.
    pub fn append(&mut self, image: MediaImage) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<MediaImage> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Image at a signed UI index; negative or out-of-range indexes yield `None`.
    pub fn get(&self, index: i32) -> Option<&MediaImage> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.images.get(i))
    }

    pub fn first(&self) -> Option<&MediaImage> {
        self.images.first()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaImage> {
        self.images.iter()
    }
}

impl FromIterator<MediaImage> for MediaSources {
    fn from_iter<I: IntoIterator<Item = MediaImage>>(iter: I) -> Self {
        Self {
            images: iter.into_iter().collect(),
        }
    }
}

/// What the injection step did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Injection {
    /// Token not newer than the stored one; buffer untouched.
    Unchanged,
    /// Accumulation buffer reseeded from the live input.
    Live,
    /// Accumulation buffer reseeded from media source `index`.
    Media(usize),
    /// Token consumed but the index no longer resolves; buffer untouched.
    Stale(i32),
}

/// Reseed `state.accumulation` once per strictly increasing `select.last_update`.
///
/// `input` is the current raw frame and must be sized like the state buffers.
pub fn inject(
    state: &mut ProcessorState,
    select: SourceSelect,
    input: &[u8],
    sources: &MediaSources,
) -> Injection {
    if select.last_update <= state.last_update {
        return Injection::Unchanged;
    }
    state.last_update = select.last_update;

    if select.active_source == LIVE_SOURCE {
        if input.len() == state.accumulation.len() {
            state.accumulation.copy_from_slice(input);
            return Injection::Live;
        }
        return Injection::Stale(LIVE_SOURCE);
    }

    match sources.get(select.active_source) {
        Some(image) if !image.is_empty() => {
            resample_into(image, &mut state.accumulation, state.width, state.height);
            Injection::Media(select.active_source as usize)
        }
        _ => {
            tracing::debug!(
                index = select.active_source,
                available = sources.len(),
                "media source index no longer valid; keeping accumulation buffer"
            );
            Injection::Stale(select.active_source)
        }
    }
}

/// Nearest box mapping of `src` onto a `width x height` RGBA8 buffer; alpha forced opaque.
///
/// `src_x = floor(x * src_w / width)`, `src_y = floor(y * src_h / height)`.
pub fn resample_into(src: &MediaImage, dst: &mut [u8], width: u32, height: u32) {
    if src.is_empty() || width == 0 || height == 0 {
        return;
    }
    let sx_scale = f64::from(src.width) / f64::from(width);
    let sy_scale = f64::from(src.height) / f64::from(height);
    let src_w = src.width as usize;
    for y in 0..height as usize {
        let sy = ((y as f64 * sy_scale).floor() as usize).min(src.height as usize - 1);
        for x in 0..width as usize {
            let sx = ((x as f64 * sx_scale).floor() as usize).min(src_w - 1);
            let si = (sy * src_w + sx) * CHANNELS;
            let di = (y * width as usize + x) * CHANNELS;
            let (Some(s), Some(d)) = (src.rgba8.get(si..si + 3), dst.get_mut(di..di + CHANNELS))
            else {
                continue;
            };
            d[..3].copy_from_slice(s);
            d[3] = 255;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/inject.rs"]
mod tests;
