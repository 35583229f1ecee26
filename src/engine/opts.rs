use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compose::layers::LayerStyle;
use crate::foundation::core::Canvas;
use crate::foundation::error::{BoardError, BoardResult};
use crate::render::compositor::FrameStyle;

/// Options for one [`crate::BoardEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOpts {
    /// Logical canvas shared by layers, mask and output frames.
    pub canvas: Canvas,
    /// Reveal cell edge in logical pixels.
    pub pixel_size: u32,
    /// Frame budget for a full-board fill: `fill_speed = ceil(total_grid_pixels / fill_frames)`.
    ///
    /// This is a frame count, not a wall-clock duration, so the fill takes twice as long on a
    /// 30 Hz loop as on a 60 Hz one.
    pub fill_frames: u32,
    /// Time spent in `holding` before the preview blink.
    pub hold_ms: u64,
    /// Length of the `blinking` preview.
    pub blink_ms: u64,
    /// White flash at the start of `blinking`.
    pub flash_ms: u64,
    /// Seed for the reveal order and blink jitter. `None` draws fresh entropy per engine.
    pub seed: Option<u64>,
    /// Static layer appearance.
    pub style: LayerStyle,
    /// Per-frame preview appearance.
    pub frame_style: FrameStyle,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            pixel_size: 10,
            fill_frames: 120,
            hold_ms: 3000,
            blink_ms: 400,
            flash_ms: 50,
            seed: None,
            style: LayerStyle::default(),
            frame_style: FrameStyle::default(),
        }
    }
}

impl EngineOpts {
    pub fn validate(&self) -> BoardResult<()> {
        if self.pixel_size == 0 {
            return Err(BoardError::surface("pixel_size must be > 0"));
        }
        if self.fill_frames == 0 {
            return Err(BoardError::validation("fill_frames must be > 0"));
        }
        self.canvas.rgba_len()?;
        self.style.validate()?;
        self.frame_style.validate()
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn blink(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub fn flash(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }
}

pub(crate) fn check_unit(name: &str, v: f32) -> BoardResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(BoardError::validation(format!(
            "{name} must be within [0, 1], got {v}"
        )));
    }
    Ok(())
}
