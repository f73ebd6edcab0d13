use crate::foundation::{core::CHANNELS, math::clamp_coord};

/// Nearest-neighbour lookup of one channel at a fractional position.
///
/// `x`/`y` are rounded to the pixel grid and clamped to the buffer edges. A zero-area
/// buffer or a short slice yields `0`.
pub fn sample_nearest(
    buf: &[u8],
    width: u32,
    height: u32,
    x: f32,
    y: f32,
    channel: usize,
) -> u8 {
    if width == 0 || height == 0 {
        return 0;
    }
    let sx = clamp_coord(round_coord(x), width);
    let sy = clamp_coord(round_coord(y), height);
    texel(buf, width, sx, sy, channel)
}

/// Bilinear lookup of one channel at a fractional position.
///
/// The four surrounding lattice points are clamped independently, so sampling past an
/// edge smears the border pixels rather than reading out of bounds.
pub fn sample_bilinear(
    buf: &[u8],
    width: u32,
    height: u32,
    x: f32,
    y: f32,
    channel: usize,
) -> f32 {
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return 0.0;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = x - x0;
    let wy = y - y0;

    let x0 = x0 as i64;
    let y0 = y0 as i64;
    let sx0 = clamp_coord(x0, width);
    let sy0 = clamp_coord(y0, height);
    let sx1 = clamp_coord(x0 + 1, width);
    let sy1 = clamp_coord(y0 + 1, height);

    let v00 = f32::from(texel(buf, width, sx0, sy0, channel));
    let v10 = f32::from(texel(buf, width, sx1, sy0, channel));
    let v01 = f32::from(texel(buf, width, sx0, sy1, channel));
    let v11 = f32::from(texel(buf, width, sx1, sy1, channel));

    (1.0 - wy) * ((1.0 - wx) * v00 + wx * v10) + wy * ((1.0 - wx) * v01 + wx * v11)
}

fn round_coord(v: f32) -> i64 {
    if v.is_finite() { v.round() as i64 } else { 0 }
}

fn texel(buf: &[u8], width: u32, x: usize, y: usize, channel: usize) -> u8 {
    let idx = (y * width as usize + x) * CHANNELS + channel;
    buf.get(idx).copied().unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/resample/sample.rs"]
mod tests;
