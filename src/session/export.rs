use std::time::Duration;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::engine::board_engine::BoardEngine;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::BoardResult;

/// Summary of an offline export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: u64,
    /// Simulated clock at the last frame.
    pub duration: Duration,
}

/// Render `frame_count` frames with a simulated clock (`now = i / fps`) into `sink`.
///
/// The cycle is restarted first, so the same seed always produces the same frames.
#[tracing::instrument(skip(engine, sink))]
pub fn export_frames<S: FrameSink + ?Sized>(
    engine: &mut BoardEngine,
    fps: Fps,
    frame_count: u64,
    sink: &mut S,
) -> BoardResult<RenderStats> {
    engine.restart()?;
    let canvas = engine.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
    })?;

    let mut duration = Duration::ZERO;
    for i in 0..frame_count {
        duration = fps.frame_start(i);
        let frame = engine.tick(duration)?;
        sink.push_frame(FrameIndex(i), frame)?;
    }
    sink.end()?;

    tracing::info!(frames = frame_count, "export finished");
    Ok(RenderStats {
        frames: frame_count,
        duration,
    })
}

/// Frames in one `filling -> holding -> blinking -> resetting` cycle at `fps`, for the
/// engine's current inputs. Zero without inputs.
pub fn cycle_frame_count(engine: &BoardEngine, fps: Fps) -> u64 {
    let status = engine.status();
    if status.total_grid_pixels == 0 {
        return 0;
    }
    let fill = status
        .target_pixel_count
        .div_ceil(status.fill_speed.max(1))
        .max(1);
    let opts = engine.opts();
    // Hold and blink end on the first frame strictly past their duration.
    let hold = fps.frames_in(opts.hold()) + 1;
    let blink = fps.frames_in(opts.blink()) + 1;
    fill + hold + blink + 1
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
