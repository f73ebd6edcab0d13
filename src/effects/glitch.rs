//! Stateless, time-seeded glitch effects.
//!
//! Both read from a snapshot of the incoming frame and only touch RGB.

use crate::{
    effects::{
        Applied,
        params::{BlockCorruptParams, GlitchParams},
    },
    foundation::{
        core::{CHANNELS, Frame},
        math::to_u8_sat,
        random::pseudo_random,
    },
    motion::field::BlockGrid,
};

fn rand_at(seed: f64) -> f64 {
    pseudo_random(seed.floor() as i64)
}

/// Horizontal slice displacement on one colour channel plus, above intensity 30,
/// a few corrupted scanlines.
pub fn apply_glitch(frame: &mut Frame, params: &GlitchParams, time: f64) -> Applied {
    if frame.is_empty() || params.intensity <= 0.0 {
        return Applied::Skipped;
    }
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    let intensity = f64::from(params.intensity);
    let t = time * f64::from(params.speed) / 10.0;
    let seed = (t / 5.0).floor();

    let source = frame.data().to_vec();
    let data = frame.data_mut();

    let slices = (3.0 + intensity / 20.0).floor() as u32;
    for s in 0..slices {
        let s = f64::from(s);
        let slice_y = (rand_at(seed + s * 1000.0) * h as f64).floor() as usize;
        let slice_h = (2.0 + rand_at(seed + s * 2000.0) * intensity / 3.0).floor() as usize;
        let shift = ((rand_at(seed + s * 3000.0) - 0.5) * intensity * 2.0).floor() as i64;
        let channel = ((rand_at(seed + s * 4000.0) * 3.0).floor() as usize).min(2);

        for y in slice_y..(slice_y + slice_h).min(h) {
            for x in 0..w {
                let src_x = (x as i64 - shift).rem_euclid(w as i64) as usize;
                let di = (y * w + x) * CHANNELS;
                let si = (y * w + src_x) * CHANNELS;
                data[di..di + 3].copy_from_slice(&source[di..di + 3]);
                data[di + channel] = source[si + channel];
            }
        }
    }

    if intensity > 30.0 {
        let lines = (intensity / 20.0).floor() as u32;
        for c in 0..lines {
            let c = f64::from(c);
            let y = ((rand_at(seed + c * 5000.0 + t) * h as f64).floor() as usize).min(h - 1);
            let kind = (rand_at(seed + c * 6000.0) * 3.0).floor() as u32;
            for x in 0..w {
                let i = (y * w + x) * CHANNELS;
                match kind {
                    0 => {
                        let v = if rand_at(seed + x as f64) > 0.5 { 255 } else { 0 };
                        data[i..i + 3].fill(v);
                    }
                    1 => {
                        let v = data[(y * w + x / 8 * 8) * CHANNELS + x % 3];
                        data[i..i + 3].fill(v);
                    }
                    _ => {
                        let ch = ((rand_at(seed + x as f64) * 3.0).floor() as usize).min(2);
                        data[i + ch] = 255;
                    }
                }
            }
        }
    }
    Applied::Rendered
}

/// Corrupt `floor(blocks * intensity / 100 * 0.3)` randomly picked blocks.
///
/// Each block gets one of: a copy of another block, a wrapping horizontal shift, its
/// average colour, or its first pixel repeated.
pub fn apply_block_corrupt(frame: &mut Frame, params: &BlockCorruptParams, time: f64) -> Applied {
    if frame.is_empty() || params.intensity <= 0.0 {
        return Applied::Skipped;
    }
    let grid = BlockGrid::new(frame.width(), frame.height(), params.block_size);
    let (w, h) = (grid.width as usize, grid.height as usize);
    let bs = grid.block_size as usize;
    let seed = (time / 8.0).floor();
    let count =
        (grid.block_count() as f64 * f64::from(params.intensity) / 100.0 * 0.3).floor() as u32;

    let source = frame.data().to_vec();
    let data = frame.data_mut();

    for i in 0..count {
        let i = f64::from(i);
        let pick = |k: f64, n: u32| {
            ((rand_at(seed + i * k) * f64::from(n)).floor() as u32).min(n - 1)
        };
        let bx = pick(100.0, grid.blocks_x);
        let by = pick(200.0, grid.blocks_y);
        let effect = (rand_at(seed + i * 300.0) * 4.0).floor() as u32;
        let (x0, y0, x1, y1) = grid.block_rect(bx, by);
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);

        match effect {
            0 => {
                let sx0 = pick(400.0, grid.blocks_x) as usize * bs;
                let sy0 = pick(500.0, grid.blocks_y) as usize * bs;
                for y in y0..y1 {
                    for x in x0..x1 {
                        let (sx, sy) = (sx0 + (x - x0), sy0 + (y - y0));
                        if sx >= w || sy >= h {
                            continue;
                        }
                        let di = (y * w + x) * CHANNELS;
                        let si = (sy * w + sx) * CHANNELS;
                        data[di..di + 3].copy_from_slice(&source[si..si + 3]);
                    }
                }
            }
            1 => {
                let shift = ((rand_at(seed + i * 600.0) - 0.5) * bs as f64 * 2.0).floor() as i64;
                for y in y0..y1 {
                    for x in x0..x1 {
                        let sx = (x as i64 + shift).rem_euclid(w as i64) as usize;
                        let di = (y * w + x) * CHANNELS;
                        let si = (y * w + sx) * CHANNELS;
                        data[di..di + 3].copy_from_slice(&source[si..si + 3]);
                    }
                }
            }
            2 => {
                let mut sum = [0u64; 3];
                for y in y0..y1 {
                    for x in x0..x1 {
                        let si = (y * w + x) * CHANNELS;
                        for c in 0..3 {
                            sum[c] += u64::from(source[si + c]);
                        }
                    }
                }
                let n = ((x1 - x0) * (y1 - y0)).max(1) as f32;
                let avg = sum.map(|s| to_u8_sat(s as f32 / n));
                fill_rgb(data, w, (x0, y0, x1, y1), avg);
            }
            _ => {
                let fi = (y0 * w + x0) * CHANNELS;
                let first = [source[fi], source[fi + 1], source[fi + 2]];
                fill_rgb(data, w, (x0, y0, x1, y1), first);
            }
        }
    }
    Applied::Rendered
}

fn fill_rgb(data: &mut [u8], w: usize, rect: (usize, usize, usize, usize), rgb: [u8; 3]) {
    let (x0, y0, x1, y1) = rect;
    for y in y0..y1 {
        for x in x0..x1 {
            let di = (y * w + x) * CHANNELS;
            data[di..di + 3].copy_from_slice(&rgb);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/glitch.rs"]
mod tests;
