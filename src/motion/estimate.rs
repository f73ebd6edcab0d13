use rayon::prelude::*;

use crate::{
    foundation::{
        core::{CHANNELS, rgba_len},
        error::{MoshError, MoshResult},
    },
    motion::field::BlockGrid,
};

/// How a sample pair is scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMetric {
    /// `|(r+g+b) - (r'+g'+b')|`: one comparison per sample.
    Luma,
    /// `|r-r'| + |g-g'| + |b-b'|`.
    Rgb,
}

/// Block-matching search configuration.
///
/// Strides of `0` are treated as `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchParams {
    pub block_size: u32,
    pub radius: u32,
    pub search_stride: u32,
    pub sample_stride: u32,
    pub metric: MatchMetric,
}

/// Integer displacement of one block: `current(x, y)` best matches `reference(x+dx, y+dy)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockOffset {
    pub dx: i32,
    pub dy: i32,
}

/// Sparse block-matching motion search between two same-sized RGBA8 frames.
///
/// For every block, candidate offsets on the lattice `-radius, -radius + stride, ..`
/// (up to `radius`) are scored by the mean absolute difference over sample points
/// spaced `sample_stride` apart; reference samples outside the frame are skipped and
/// do not count toward the mean. The lowest mean wins and ties keep the earliest
/// candidate in `(dy, dx)` scan order, except that the zero offset (when it lies on
/// the lattice) is scored first, so a region with no detectable motion stays put.
/// A block with no in-bounds candidate at all reports `(-radius, -radius)`.
///
/// Output is raw, one offset per block in row-major block order; temporal smoothing is
/// left to the caller.
pub fn estimate(
    current: &[u8],
    reference: &[u8],
    width: u32,
    height: u32,
    params: &SearchParams,
) -> MoshResult<Vec<BlockOffset>> {
    let job = SearchJob::new(current, reference, width, height, params)?;
    let mut out = vec![BlockOffset::default(); job.grid.block_count()];
    if out.is_empty() {
        return Ok(out);
    }
    let row_len = job.grid.blocks_x as usize;
    for (by, row) in out.chunks_mut(row_len).enumerate() {
        job.search_row(by as u32, row);
    }
    Ok(out)
}

/// [`estimate`], fanned out across block rows on `pool`.
///
/// Blocks are searched independently, so the result is identical to the sequential run.
pub fn estimate_in(
    pool: &rayon::ThreadPool,
    current: &[u8],
    reference: &[u8],
    width: u32,
    height: u32,
    params: &SearchParams,
) -> MoshResult<Vec<BlockOffset>> {
    let job = SearchJob::new(current, reference, width, height, params)?;
    let mut out = vec![BlockOffset::default(); job.grid.block_count()];
    if out.is_empty() {
        return Ok(out);
    }
    let row_len = job.grid.blocks_x as usize;
    pool.install(|| {
        out.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(by, row)| job.search_row(by as u32, row));
    });
    Ok(out)
}

struct SearchJob<'a> {
    current: &'a [u8],
    reference: &'a [u8],
    grid: BlockGrid,
    candidates: Vec<i32>,
    has_zero: bool,
    radius: i32,
    sample_stride: usize,
    metric: MatchMetric,
}

/// Mean score kept as an exact fraction so comparisons are stable.
#[derive(Clone, Copy, Debug)]
struct Score {
    sum: u64,
    samples: u64,
}

impl Score {
    fn lt(self, other: Score) -> bool {
        u128::from(self.sum) * u128::from(other.samples)
            < u128::from(other.sum) * u128::from(self.samples)
    }
}

impl<'a> SearchJob<'a> {
    fn new(
        current: &'a [u8],
        reference: &'a [u8],
        width: u32,
        height: u32,
        params: &SearchParams,
    ) -> MoshResult<Self> {
        let expected = rgba_len(width, height)?;
        if current.len() != expected || reference.len() != expected {
            return Err(MoshError::frame(format!(
                "motion search expects two {width}x{height} buffers ({expected} bytes), got {} and {}",
                current.len(),
                reference.len()
            )));
        }
        let radius = i32::try_from(params.radius)
            .map_err(|_| MoshError::validation("search radius out of range"))?;
        let stride = params.search_stride.max(1) as usize;
        let candidates: Vec<i32> = (-radius..=radius).step_by(stride).collect();
        let has_zero = candidates.contains(&0);
        Ok(Self {
            current,
            reference,
            grid: BlockGrid::new(width, height, params.block_size),
            candidates,
            has_zero,
            radius,
            sample_stride: params.sample_stride.max(1) as usize,
            metric: params.metric,
        })
    }

    fn search_row(&self, by: u32, row: &mut [BlockOffset]) {
        for (bx, slot) in row.iter_mut().enumerate() {
            *slot = self.search_block(bx as u32, by);
        }
    }

    fn search_block(&self, bx: u32, by: u32) -> BlockOffset {
        let rect = self.grid.block_rect(bx, by);
        let mut best: Option<(Score, BlockOffset)> = None;

        if self.has_zero
            && let Some(s) = self.score(rect, 0, 0)
        {
            best = Some((s, BlockOffset::default()));
        }

        for &dy in &self.candidates {
            for &dx in &self.candidates {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(s) = self.score(rect, dx, dy) else {
                    continue;
                };
                if best.is_none_or(|(b, _)| s.lt(b)) {
                    best = Some((s, BlockOffset { dx, dy }));
                }
            }
        }

        best.map(|(_, o)| o).unwrap_or(BlockOffset {
            dx: -self.radius,
            dy: -self.radius,
        })
    }

    /// `None` when no sample lands inside the reference frame.
    fn score(&self, (x0, y0, x1, y1): (u32, u32, u32, u32), dx: i32, dy: i32) -> Option<Score> {
        let w = i64::from(self.grid.width);
        let h = i64::from(self.grid.height);
        let mut sum = 0u64;
        let mut samples = 0u64;
        for py in (y0..y1).step_by(self.sample_stride) {
            let sy = i64::from(py) + i64::from(dy);
            if sy < 0 || sy >= h {
                continue;
            }
            for px in (x0..x1).step_by(self.sample_stride) {
                let sx = i64::from(px) + i64::from(dx);
                if sx < 0 || sx >= w {
                    continue;
                }
                let ci = (py as usize * self.grid.width as usize + px as usize) * CHANNELS;
                let si = (sy as usize * self.grid.width as usize + sx as usize) * CHANNELS;
                sum += self.sample_diff(ci, si);
                samples += 1;
            }
        }
        (samples > 0).then_some(Score { sum, samples })
    }

    fn sample_diff(&self, ci: usize, si: usize) -> u64 {
        let c = &self.current[ci..ci + 3];
        let r = &self.reference[si..si + 3];
        match self.metric {
            MatchMetric::Luma => {
                let lc = u32::from(c[0]) + u32::from(c[1]) + u32::from(c[2]);
                let lr = u32::from(r[0]) + u32::from(r[1]) + u32::from(r[2]);
                u64::from(lc.abs_diff(lr))
            }
            MatchMetric::Rgb => c
                .iter()
                .zip(r)
                .map(|(&a, &b)| u64::from(a.abs_diff(b)))
                .sum(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/estimate.rs"]
mod tests;
