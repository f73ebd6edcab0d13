use std::sync::Arc;

use crate::foundation::error::{MoshError, MoshResult};

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Byte length of a `width x height` RGBA8 buffer.
pub fn rgba_len(width: u32, height: u32) -> MoshResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| MoshError::frame("rgba buffer size overflow"))
}

/// One frame of straight (unpremultiplied) RGBA8 pixels, row-major.
///
/// The pixel length always equals `width * height * 4`; the buffer can be mutated in
/// place but never resized.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
    timestamp: f64,
}

impl Frame {
    /// Wrap an RGBA8 buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>, timestamp: f64) -> MoshResult<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(MoshError::frame(format!(
                "frame {width}x{height} expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            timestamp,
        })
    }

    /// A frame where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4], timestamp: f64) -> MoshResult<Self> {
        let len = rgba_len(width, height)?;
        let data = rgba.repeat(len / CHANNELS);
        Self::new(width, height, data, timestamp)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Source timestamp (frame count or wall-clock derived), non-decreasing per source.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: f64) {
        self.timestamp = timestamp;
    }

    /// `true` when the frame has zero area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGBA of pixel `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }
}

/// An externally supplied still image (uploaded media or a decoded video frame).
///
/// Dimensions are independent of the working resolution. Pixels are shared so the
/// media list can be cloned cheaply by the UI layer.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Arc<Vec<u8>>,
}

impl MediaImage {
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> MoshResult<Self> {
        let expected = rgba_len(width, height)?;
        if rgba8.len() != expected {
            return Err(MoshError::frame(format!(
                "media image {width}x{height} expects {expected} bytes, got {}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Snapshot a frame's pixels as a media image.
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            rgba8: Arc::new(frame.data().to_vec()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
