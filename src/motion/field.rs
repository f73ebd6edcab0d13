use crate::{foundation::math::div_ceil_u32, motion::estimate::BlockOffset};

/// Non-overlapping `block_size` tiling of a frame; edge tiles are clipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    pub width: u32,
    pub height: u32,
    pub block_size: u32,
    pub blocks_x: u32,
    pub blocks_y: u32,
}

impl BlockGrid {
    /// `block_size == 0` is treated as 1.
    pub fn new(width: u32, height: u32, block_size: u32) -> Self {
        let block_size = block_size.max(1);
        Self {
            width,
            height,
            block_size,
            blocks_x: div_ceil_u32(width, block_size),
            blocks_y: div_ceil_u32(height, block_size),
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks_x as usize * self.blocks_y as usize
    }

    /// Pixel bounds `[x0, x1) x [y0, y1)` of block `(bx, by)`.
    pub fn block_rect(&self, bx: u32, by: u32) -> (u32, u32, u32, u32) {
        let x0 = bx * self.block_size;
        let y0 = by * self.block_size;
        (
            x0,
            y0,
            (x0 + self.block_size).min(self.width),
            (y0 + self.block_size).min(self.height),
        )
    }

    /// Index of the block covering pixel `(x, y)`.
    pub fn block_index_at(&self, x: u32, y: u32) -> usize {
        let bx = (x / self.block_size).min(self.blocks_x.saturating_sub(1));
        let by = (y / self.block_size).min(self.blocks_y.saturating_sub(1));
        by as usize * self.blocks_x as usize + bx as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionVector {
    pub dx: f32,
    pub dy: f32,
}

/// Per-block displacement estimates, temporally smoothed across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionField {
    grid: BlockGrid,
    vectors: Vec<MotionVector>,
}

impl MotionField {
    pub fn zeroed(grid: BlockGrid) -> Self {
        Self {
            grid,
            vectors: vec![MotionVector::default(); grid.block_count()],
        }
    }

    /// A field over no blocks, used by effects that never search.
    pub fn empty() -> Self {
        Self::zeroed(BlockGrid::new(0, 0, 1))
    }

    pub fn grid(&self) -> BlockGrid {
        self.grid
    }

    pub fn vectors(&self) -> &[MotionVector] {
        &self.vectors
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Rebuild as all-zero when the tiling no longer matches.
    ///
    /// Returns `true` when the field was reset.
    pub fn ensure_grid(&mut self, grid: BlockGrid) -> bool {
        if self.grid == grid && self.vectors.len() == grid.block_count() {
            return false;
        }
        *self = Self::zeroed(grid);
        true
    }

    /// Exponential smoothing toward a fresh search: `v = v * keep + raw * (1 - keep)`.
    pub fn blend_toward(&mut self, raw: &[BlockOffset], keep: f32) {
        let keep = keep.clamp(0.0, 1.0);
        let take = 1.0 - keep;
        for (v, r) in self.vectors.iter_mut().zip(raw) {
            v.dx = v.dx * keep + r.dx as f32 * take;
            v.dy = v.dy * keep + r.dy as f32 * take;
        }
    }

    /// Vector of the block covering pixel `(x, y)`.
    pub fn at_pixel(&self, x: u32, y: u32) -> MotionVector {
        if self.vectors.is_empty() {
            return MotionVector::default();
        }
        self.vectors[self.grid.block_index_at(x, y)]
    }

    /// 3x3 block-neighbourhood mean with edge-clamped neighbour indices.
    pub fn box_smoothed(&self) -> MotionField {
        let bx_max = i64::from(self.grid.blocks_x) - 1;
        let by_max = i64::from(self.grid.blocks_y) - 1;
        let mut out = Self::zeroed(self.grid);
        for by in 0..=by_max {
            for bx in 0..=bx_max {
                let mut sum = MotionVector::default();
                for ky in -1..=1i64 {
                    for kx in -1..=1i64 {
                        let ny = (by + ky).clamp(0, by_max);
                        let nx = (bx + kx).clamp(0, bx_max);
                        let v = self.vectors[(ny * (bx_max + 1) + nx) as usize];
                        sum.dx += v.dx;
                        sum.dy += v.dy;
                    }
                }
                out.vectors[(by * (bx_max + 1) + bx) as usize] = MotionVector {
                    dx: sum.dx / 9.0,
                    dy: sum.dy / 9.0,
                };
            }
        }
        out
    }

    /// Displacement at pixel `(x, y)`, bilinearly interpolated between block centres.
    pub fn sample_bilinear(&self, x: u32, y: u32) -> MotionVector {
        if self.vectors.is_empty() {
            return MotionVector::default();
        }
        let bs = self.grid.block_size as f32;
        let fx = (x as f32 + 0.5) / bs - 0.5;
        let fy = (y as f32 + 0.5) / bs - 0.5;
        let bx_max = self.grid.blocks_x as f32 - 1.0;
        let by_max = self.grid.blocks_y as f32 - 1.0;
        let fx = fx.clamp(0.0, bx_max);
        let fy = fy.clamp(0.0, by_max);

        let x0 = fx.floor();
        let y0 = fy.floor();
        let wx = fx - x0;
        let wy = fy - y0;
        let x1 = (x0 + 1.0).min(bx_max);
        let y1 = (y0 + 1.0).min(by_max);

        let at = |bx: f32, by: f32| {
            self.vectors[by as usize * self.grid.blocks_x as usize + bx as usize]
        };
        let (v00, v10, v01, v11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));
        let lerp2 = |a: f32, b: f32, c: f32, d: f32| {
            (1.0 - wy) * ((1.0 - wx) * a + wx * b) + wy * ((1.0 - wx) * c + wx * d)
        };
        MotionVector {
            dx: lerp2(v00.dx, v10.dx, v01.dx, v11.dx),
            dy: lerp2(v00.dy, v10.dy, v01.dy, v11.dy),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/field.rs"]
mod tests;
