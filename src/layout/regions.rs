use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Rect};
use crate::model::board::Domain;

/// Rectangular canvas area owned by one domain, in logical canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub domain_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Partition the canvas among `domains`.
///
/// Exactly four domains get a 2x2 grid in list order (row-major); any other count gets equal
/// horizontal strips top to bottom. No domains yields no regions.
pub fn compute_regions(domains: &[Domain], canvas: Canvas) -> Vec<Region> {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);

    if domains.len() == 4 {
        let half_w = w / 2.0;
        let half_h = h / 2.0;
        return domains
            .iter()
            .enumerate()
            .map(|(idx, d)| Region {
                domain_id: d.id.clone(),
                x: (idx % 2) as f64 * half_w,
                y: (idx / 2) as f64 * half_h,
                width: half_w,
                height: half_h,
            })
            .collect();
    }

    let strip_h = h / domains.len().max(1) as f64;
    domains
        .iter()
        .enumerate()
        .map(|(idx, d)| Region {
            domain_id: d.id.clone(),
            x: 0.0,
            y: idx as f64 * strip_h,
            width: w,
            height: strip_h,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/regions.rs"]
mod tests;
