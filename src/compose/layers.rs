use serde::{Deserialize, Serialize};

use crate::assets::loader::ImageTable;
use crate::engine::opts::check_unit;
use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul};
use crate::foundation::error::BoardResult;
use crate::layout::regions::{Region, compute_regions};
use crate::model::board::{BoardType, Domain};
use crate::model::color::parse_hex_color;
use crate::raster::surface::Surface;

/// Most images a multi-image region shows.
pub const MAX_IMAGES_PER_REGION: usize = 4;

/// Static appearance of the base (unrevealed) and target (revealed) layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerStyle {
    /// Base-layer fill for regions without a usable image.
    pub placeholder_base_hex: String,
    /// White alpha of the placeholder diagonal.
    pub placeholder_line_alpha: f32,
    /// Grid line period, in reveal cells.
    pub grid_spacing_cells: u32,
    /// Grid line width in logical pixels; lines thinner than one pixel are drawn fainter.
    pub grid_line_width: f32,
    /// White alpha of grid lines on the base layer.
    pub base_grid_alpha: f32,
    /// White alpha of grid lines on the target layer.
    pub target_grid_alpha: f32,
    /// Black overlay alpha applied after desaturating base-layer images.
    pub base_darken_alpha: f32,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            placeholder_base_hex: "#222222".to_string(),
            placeholder_line_alpha: 0.1,
            grid_spacing_cells: 2,
            grid_line_width: 0.5,
            base_grid_alpha: 0.05,
            target_grid_alpha: 0.1,
            base_darken_alpha: 0.4,
        }
    }
}

impl LayerStyle {
    pub fn validate(&self) -> BoardResult<()> {
        parse_hex_color(&self.placeholder_base_hex)?;
        check_unit("placeholder_line_alpha", self.placeholder_line_alpha)?;
        check_unit("grid_line_width", self.grid_line_width)?;
        check_unit("base_grid_alpha", self.base_grid_alpha)?;
        check_unit("target_grid_alpha", self.target_grid_alpha)?;
        check_unit("base_darken_alpha", self.base_darken_alpha)
    }

    fn placeholder_base(&self) -> Rgba8Premul {
        parse_hex_color(&self.placeholder_base_hex).unwrap_or(Rgba8Premul::opaque(0x22, 0x22, 0x22))
    }

    fn grid_color(&self, alpha: f32) -> Rgba8Premul {
        Rgba8Premul::white(alpha * self.grid_line_width)
    }
}

/// Everything the layer build depends on.
#[derive(Clone, Copy, Debug)]
pub struct LayerInputs<'a> {
    pub board_type: BoardType,
    pub domains: &'a [Domain],
    pub images: &'a ImageTable,
    pub canvas: Canvas,
    pub pixel_size: u32,
    pub style: &'a LayerStyle,
}

/// The two static layers every frame is composed from.
#[derive(Clone, Debug)]
pub struct BoardLayers {
    /// Desaturated, darkened backdrop.
    pub base: Surface,
    /// Full-colour board.
    pub target: Surface,
    /// Regions the layers were drawn from.
    pub regions: Vec<Region>,
    /// Cells (whole regions or multi-image sub-cells) that fell back to a placeholder.
    pub placeholders: usize,
}

/// Build base and target layers. Called once per configuration, never per frame.
#[tracing::instrument(skip_all, fields(domains = inputs.domains.len(), pixel_size = inputs.pixel_size))]
pub fn build_layers(inputs: &LayerInputs<'_>) -> BoardResult<BoardLayers> {
    let regions = compute_regions(inputs.domains, inputs.canvas);
    let mut painter = LayerPainter {
        base: Surface::new(inputs.canvas)?,
        target: Surface::new(inputs.canvas)?,
        style: inputs.style,
        placeholders: 0,
    };

    for region in &regions {
        let Some(domain) = inputs.domains.iter().find(|d| d.id == region.domain_id) else {
            continue;
        };
        let rect = region.rect();
        let image_count = domain.images.len();

        if inputs.board_type == BoardType::Weekly || image_count <= 1 {
            painter.cell(domain, inputs.images, 0, rect);
            continue;
        }

        let shown = image_count.min(MAX_IMAGES_PER_REGION);
        let (cols, rows) = sub_grid(shown);
        let sub_w = rect.width() / cols as f64;
        let sub_h = rect.height() / rows as f64;
        for idx in 0..shown {
            let x = rect.x0 + (idx % cols) as f64 * sub_w;
            let y = rect.y0 + (idx / cols) as f64 * sub_h;
            painter.cell(domain, inputs.images, idx, Rect::new(x, y, x + sub_w, y + sub_h));
        }
    }

    // An empty board stays fully transparent, grid included.
    if !regions.is_empty() {
        let spacing = inputs
            .pixel_size
            .saturating_mul(inputs.style.grid_spacing_cells);
        painter
            .base
            .draw_grid(spacing, inputs.style.grid_color(inputs.style.base_grid_alpha));
        painter
            .target
            .draw_grid(spacing, inputs.style.grid_color(inputs.style.target_grid_alpha));
    }

    tracing::debug!(
        regions = regions.len(),
        placeholders = painter.placeholders,
        "built board layers"
    );
    Ok(BoardLayers {
        base: painter.base,
        target: painter.target,
        regions,
        placeholders: painter.placeholders,
    })
}

/// Near-square sub-grid for `n` images: `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`.
pub fn sub_grid(n: usize) -> (usize, usize) {
    let cols = ((n as f64).sqrt().ceil() as usize).max(1);
    (cols, n.div_ceil(cols).max(1))
}

struct LayerPainter<'a> {
    base: Surface,
    target: Surface,
    style: &'a LayerStyle,
    placeholders: usize,
}

impl LayerPainter<'_> {
    fn cell(&mut self, domain: &Domain, images: &ImageTable, index: usize, rect: Rect) {
        let Some(img) = images.get(&domain.id, index) else {
            self.placeholder(domain, rect);
            return;
        };
        self.target.draw_image_cover(img, rect);

        self.base.draw_image_cover(img, rect);
        self.base.desaturate_rect(rect);
        let darken = (self.style.base_darken_alpha * 255.0).round() as u8;
        self.base
            .fill_rect(rect, Rgba8Premul::from_straight_rgba(0, 0, 0, darken));
    }

    fn placeholder(&mut self, domain: &Domain, rect: Rect) {
        self.placeholders += 1;
        let base = self.style.placeholder_base();
        let color = parse_hex_color(&domain.color_hex).unwrap_or_else(|e| {
            tracing::warn!(domain = domain.label(), color = %domain.color_hex, error = %e, "unusable domain colour");
            base
        });
        self.target.fill_rect(rect, color);
        self.base.fill_rect(rect, base);

        let line = Rgba8Premul::white(self.style.placeholder_line_alpha);
        let (p0, p1) = (Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1));
        self.target.stroke_line(p0, p1, line);
        self.base.stroke_line(p0, p1, line);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layers.rs"]
mod tests;
