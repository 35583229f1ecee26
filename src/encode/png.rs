use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BoardError, BoardResult};
use crate::render::frame::FrameRGBA;

/// Writes each frame as `<dir>/<prefix>_<index>.png` with straight alpha.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame".to_string(),
            cfg: None,
            written: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written since the last `begin`, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}_{:05}.png", self.prefix, idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> BoardResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create output directory '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BoardResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| BoardError::render("png sink not started"))?;
        if (frame.width, frame.height) != (cfg.width, cfg.height) {
            return Err(BoardError::render(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let path = self.frame_path(idx);
        write_png(frame, &path)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> BoardResult<()> {
        tracing::debug!(frames = self.written.len(), dir = %self.dir.display(), "png sequence written");
        self.cfg = None;
        Ok(())
    }
}

/// Save one frame as PNG, creating parent directories as needed.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> BoardResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    frame
        .to_straight_image()?
        .save(path)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
