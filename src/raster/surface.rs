use image::imageops::{self, FilterType};

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul};
use crate::foundation::error::BoardResult;
use crate::raster::composite::{desaturate, over};

/// Integer pixel span `[x0, x1) x [y0, y1)`, already clipped to a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }
}

/// Software raster surface in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface, failing for empty or overflowing canvases.
    pub fn new(canvas: Canvas) -> BoardResult<Self> {
        let len = canvas.rgba_len()?;
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Snap `rect` to whole pixels (edges rounded, so neighbours sharing an edge never overlap or
    /// leave a gap) and clip to the surface.
    pub fn pixel_bounds(&self, rect: Rect) -> Option<PixelBounds> {
        let clip = |v: f64, max: u32| -> u32 {
            if v.is_nan() {
                return 0;
            }
            v.round().clamp(0.0, f64::from(max)) as u32
        };
        let b = PixelBounds {
            x0: clip(rect.x0.min(rect.x1), self.width),
            y0: clip(rect.y0.min(rect.y1), self.height),
            x1: clip(rect.x0.max(rect.x1), self.width),
            y1: clip(rect.y0.max(rect.y1), self.height),
        };
        (b.x0 < b.x1 && b.y0 < b.y1).then_some(b)
    }

    /// Source-over fill.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8Premul) {
        let Some(b) = self.pixel_bounds(rect) else {
            return;
        };
        let src = color.to_array();
        self.for_each_in(b, |px| over(px, src, 1.0));
    }

    /// Replace every pixel in `rect` by its `saturation`-blended grey.
    pub fn desaturate_rect(&mut self, rect: Rect) {
        if let Some(b) = self.pixel_bounds(rect) {
            self.for_each_in(b, desaturate);
        }
    }

    /// Draw `img` cover-fit into `rect`: scale to fill while keeping aspect ratio, centre, and clip
    /// to `rect`.
    pub fn draw_image_cover(&mut self, img: &PreparedImage, rect: Rect) {
        let Some(b) = self.pixel_bounds(rect) else {
            return;
        };
        let (rw, rh) = (rect.width().abs(), rect.height().abs());
        let (iw, ih) = (f64::from(img.width), f64::from(img.height));

        let scale = if img.aspect() > rw / rh {
            rh / ih
        } else {
            rw / iw
        };
        let draw_x = rect.x0 + (rw - iw * scale) / 2.0;
        let draw_y = rect.y0 + (rh - ih * scale) / 2.0;

        // Source window that lands on the clipped destination pixels.
        let sx0 = ((f64::from(b.x0) - draw_x) / scale).floor().clamp(0.0, iw - 1.0) as u32;
        let sy0 = ((f64::from(b.y0) - draw_y) / scale).floor().clamp(0.0, ih - 1.0) as u32;
        let sx1 = ((f64::from(b.x1) - draw_x) / scale).ceil().clamp(1.0, iw) as u32;
        let sy1 = ((f64::from(b.y1) - draw_y) / scale).ceil().clamp(1.0, ih) as u32;
        let sw = sx1.saturating_sub(sx0).max(1);
        let sh = sy1.saturating_sub(sy0).max(1);

        // Resample the window at the true scale, then skip the part of it that falls left of or
        // above the destination so cropping keeps its sub-pixel offset.
        let ww = ((f64::from(sw) * scale).round() as u32).max(1);
        let wh = ((f64::from(sh) * scale).round() as u32).max(1);
        let window = imageops::crop_imm(img.premul.as_ref(), sx0, sy0, sw, sh).to_image();
        let scaled = imageops::resize(&window, ww, wh, FilterType::Triangle);
        let off_x = (f64::from(b.x0) - (draw_x + f64::from(sx0) * scale))
            .round()
            .max(0.0) as u32;
        let off_y = (f64::from(b.y0) - (draw_y + f64::from(sy0) * scale))
            .round()
            .max(0.0) as u32;

        for fy in 0..b.height() {
            let sy = (off_y + fy).min(wh - 1);
            for fx in 0..b.width() {
                let src = scaled.get_pixel((off_x + fx).min(ww - 1), sy).0;
                let i = self.index(b.x0 + fx, b.y0 + fy);
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                self.data[i..i + 4].copy_from_slice(&over(dst, src, 1.0));
            }
        }
    }

    /// One-pixel aliased line from `p0` to `p1`, blended source-over.
    pub fn stroke_line(&mut self, p0: Point, p1: Point, color: Rgba8Premul) {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u64;
        let src = color.to_array();
        let mut last = None;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let x = (p0.x + dx * t).floor();
            let y = (p0.y + dy * t).floor();
            if x < 0.0 || y < 0.0 || x >= f64::from(self.width) || y >= f64::from(self.height) {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if last == Some((x, y)) {
                continue;
            }
            last = Some((x, y));
            let i = self.index(x, y);
            let dst = [
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ];
            self.data[i..i + 4].copy_from_slice(&over(dst, src, 1.0));
        }
    }

    /// Hairline grid every `spacing` pixels, starting at the origin.
    pub fn draw_grid(&mut self, spacing: u32, color: Rgba8Premul) {
        if spacing == 0 {
            return;
        }
        let src = color.to_array();
        for y in 0..self.height {
            let on_row = y % spacing == 0;
            for x in 0..self.width {
                if on_row || x % spacing == 0 {
                    let i = self.index(x, y);
                    let dst = [
                        self.data[i],
                        self.data[i + 1],
                        self.data[i + 2],
                        self.data[i + 3],
                    ];
                    self.data[i..i + 4].copy_from_slice(&over(dst, src, 1.0));
                }
            }
        }
    }

    fn for_each_in(&mut self, b: PixelBounds, f: impl Fn([u8; 4]) -> [u8; 4]) {
        for y in b.y0..b.y1 {
            let row = self.index(b.x0, y);
            let end = self.index(b.x1 - 1, y) + 4;
            for px in self.data[row..end].chunks_exact_mut(4) {
                let out = f([px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&out);
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/surface.rs"]
mod tests;
