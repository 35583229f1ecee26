use crate::foundation::core::Canvas;
use crate::foundation::error::{BoardError, BoardResult};
use crate::reveal::grid::{RevealGrid, RevealOrder};

/// Canvas-sized coverage buffer, one byte per pixel (0 hidden, 255 revealed).
///
/// Painting is incremental: each call to [`RevealMask::reveal_up_to`] only touches the cells
/// added since the previous call, so the per-frame cost scales with the fill speed rather than
/// with the number of cells already visible.
#[derive(Clone, Debug)]
pub struct RevealMask {
    width: u32,
    height: u32,
    grid: RevealGrid,
    coverage: Vec<u8>,
    last_rendered: u64,
}

impl RevealMask {
    pub fn new(canvas: Canvas, grid: RevealGrid) -> BoardResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(BoardError::surface("mask canvas must be non-empty"));
        }
        let len = (canvas.width as usize)
            .checked_mul(canvas.height as usize)
            .ok_or_else(|| BoardError::surface("mask size overflow"))?;
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            grid,
            coverage: vec![0; len],
            last_rendered: 0,
        })
    }

    pub fn grid(&self) -> RevealGrid {
        self.grid
    }

    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    /// Number of order entries painted so far.
    pub fn last_rendered(&self) -> u64 {
        self.last_rendered
    }

    /// Paint `order[last_rendered..n]` and advance `last_rendered` to `n`.
    ///
    /// `n` is clamped to the order length. Never un-reveals: a smaller `n` is a no-op.
    /// Returns the number of cells painted.
    pub fn reveal_up_to(&mut self, order: &RevealOrder, n: u64) -> u64 {
        let n = n.min(order.len() as u64);
        if n <= self.last_rendered {
            return 0;
        }
        let fresh = &order.as_slice()[self.last_rendered as usize..n as usize];
        for &idx in fresh {
            self.paint_cell(idx);
        }
        self.last_rendered = n;
        fresh.len() as u64
    }

    /// Hide everything and restart from the first order entry.
    pub fn clear(&mut self) {
        self.coverage.fill(0);
        self.last_rendered = 0;
    }

    pub fn is_revealed(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.coverage[y as usize * self.width as usize + x as usize] != 0
    }

    /// Count of canvas pixels with non-zero coverage.
    pub fn covered_pixels(&self) -> usize {
        self.coverage.iter().filter(|&&c| c != 0).count()
    }

    fn paint_cell(&mut self, idx: u32) {
        let (x0, y0) = self.grid.cell_origin(idx);
        if x0 >= self.width || y0 >= self.height {
            return;
        }
        let x1 = x0.saturating_add(self.grid.pixel_size).min(self.width) as usize;
        let y1 = y0.saturating_add(self.grid.pixel_size).min(self.height) as usize;
        let w = self.width as usize;
        for y in y0 as usize..y1 {
            self.coverage[y * w + x0 as usize..y * w + x1].fill(255);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/mask.rs"]
mod tests;
