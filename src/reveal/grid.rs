use crate::foundation::core::Canvas;
use crate::foundation::error::{BoardError, BoardResult};
use crate::foundation::math::{Rng64, div_ceil_u64};
use crate::model::board::Board;

/// Reveal granularity: `pixel_size` cells covering the canvas, independent of domain regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevealGrid {
    pub cols: u32,
    pub rows: u32,
    pub pixel_size: u32,
}

impl RevealGrid {
    pub fn new(canvas: Canvas, pixel_size: u32) -> BoardResult<Self> {
        if pixel_size == 0 {
            return Err(BoardError::surface("pixel_size must be > 0"));
        }
        Ok(Self {
            cols: canvas.width.div_ceil(pixel_size),
            rows: canvas.height.div_ceil(pixel_size),
            pixel_size,
        })
    }

    /// `cols * rows`.
    pub fn total(self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }

    /// Top-left corner of cell `idx` in canvas pixels.
    pub fn cell_origin(self, idx: u32) -> (u32, u32) {
        (
            (idx % self.cols) * self.pixel_size,
            (idx / self.cols) * self.pixel_size,
        )
    }

    /// `floor(total * colored / total_pixels)`, or 0 for a board without pixels.
    pub fn target_pixel_count(self, board: &Board) -> u64 {
        if board.total_pixels == 0 {
            return 0;
        }
        let colored = board.colored_pixels.min(board.total_pixels);
        let n = u128::from(self.total()) * u128::from(colored) / u128::from(board.total_pixels);
        n as u64
    }

    /// Cells revealed per `filling` tick: `ceil(total / fill_frames)`.
    pub fn fill_speed(self, fill_frames: u32) -> u64 {
        div_ceil_u64(self.total(), u64::from(fill_frames.max(1))).max(1)
    }
}

/// Permutation of `[0, total)`: the order in which cells become visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealOrder {
    indices: Vec<u32>,
}

impl RevealOrder {
    /// Fisher-Yates shuffle of `[0, total)`.
    pub fn shuffled(total: u64, rng: &mut Rng64) -> BoardResult<Self> {
        let total = u32::try_from(total)
            .map_err(|_| BoardError::validation("reveal grid exceeds u32::MAX cells"))?;
        let mut indices: Vec<u32> = (0..total).collect();
        for i in (1..indices.len()).rev() {
            let j = rng.next_below(i as u32 + 1) as usize;
            indices.swap(i, j);
        }
        Ok(Self { indices })
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/grid.rs"]
mod tests;
