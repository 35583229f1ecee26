use std::time::Duration;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::animation::state::Phase;
use crate::compose::layers::BoardLayers;
use crate::engine::opts::check_unit;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{BoardError, BoardResult};
use crate::foundation::math::Rng64;
use crate::raster::composite::{intersect_into, over, over_in_place};
use crate::render::frame::FrameRGBA;
use crate::reveal::mask::RevealMask;

/// Appearance of the `blinking` preview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameStyle {
    /// Lowest opacity of the full target layer while blinking.
    pub blink_alpha: f32,
    /// Random opacity added on top of `blink_alpha` each frame.
    pub blink_jitter: f32,
    /// White overlay alpha during the flash at the start of `blinking`.
    pub flash_alpha: f32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            blink_alpha: 0.9,
            blink_jitter: 0.1,
            flash_alpha: 0.3,
        }
    }
}

impl FrameStyle {
    pub fn validate(&self) -> BoardResult<()> {
        check_unit("blink_alpha", self.blink_alpha)?;
        check_unit("blink_jitter", self.blink_jitter)?;
        check_unit("flash_alpha", self.flash_alpha)
    }
}

/// What a single compose call needs besides the static layers.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams<'a> {
    pub phase: Phase,
    /// Time since entering `blinking`; `None` outside that phase.
    pub blink_elapsed: Option<Duration>,
    pub flash: Duration,
    pub style: &'a FrameStyle,
}

/// Per-frame compositor owning the reusable masking scratch buffer.
#[derive(Debug)]
pub struct FrameCompositor {
    scratch: Vec<u8>,
}

impl FrameCompositor {
    pub fn new() -> Self {
        Self {
            scratch: Vec::new(),
        }
    }

    /// Base layer, then either the jittered full target (blinking) or `target ∩ mask` over it.
    pub fn compose(
        &mut self,
        layers: &BoardLayers,
        mask: &RevealMask,
        params: FrameParams<'_>,
        rng: &mut Rng64,
        out: &mut FrameRGBA,
    ) -> BoardResult<()> {
        let base = layers.base.data();
        if out.data.len() != base.len() {
            return Err(BoardError::render(format!(
                "output frame {}x{} does not match layers {}x{}",
                out.width,
                out.height,
                layers.base.width(),
                layers.base.height()
            )));
        }
        out.data.copy_from_slice(base);
        out.premultiplied = true;

        if params.phase == Phase::Blinking {
            let jitter = rng.next_f64_01() as f32 * params.style.blink_jitter;
            let alpha = (params.style.blink_alpha + jitter).min(1.0);
            over_in_place(&mut out.data, layers.target.data(), alpha)?;

            let flashing = params
                .blink_elapsed
                .is_some_and(|elapsed| elapsed < params.flash);
            if flashing {
                let white = Rgba8Premul::white(params.style.flash_alpha).to_array();
                for px in out.data.chunks_exact_mut(4) {
                    let blended = over([px[0], px[1], px[2], px[3]], white, 1.0);
                    px.copy_from_slice(&blended);
                }
            }
            return Ok(());
        }

        if mask.last_rendered() == 0 {
            return Ok(());
        }
        self.scratch.resize(base.len(), 0);
        intersect_into(&mut self.scratch, layers.target.data(), mask.coverage())?;
        over_in_place(&mut out.data, &self.scratch, 1.0)
    }
}

impl Default for FrameCompositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest-neighbour rescale of a composed frame for display.
pub fn present_nearest(frame: &FrameRGBA, width: u32, height: u32) -> BoardResult<FrameRGBA> {
    if width == 0 || height == 0 {
        return Err(BoardError::validation("presentation size must be non-zero"));
    }
    if (width, height) == (frame.width, frame.height) {
        return Ok(frame.clone());
    }
    let src = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| BoardError::render("frame buffer does not match its dimensions"))?;
    let scaled = imageops::resize(&src, width, height, FilterType::Nearest);
    Ok(FrameRGBA {
        width,
        height,
        data: scaled.into_raw(),
        premultiplied: frame.premultiplied,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
