use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::BoardResult;
use crate::render::frame::FrameRGBA;

/// Stream parameters announced to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Consumer of composed frames.
///
/// `push_frame` is called with strictly increasing indices between one `begin` and one `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> BoardResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BoardResult<()>;
    fn end(&mut self) -> BoardResult<()>;
}

/// Keeps every frame in memory. Meant for tests and embedding hosts that present frames
/// themselves.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called after the last `begin`.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn into_frames(self) -> Vec<(FrameIndex, FrameRGBA)> {
        self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> BoardResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BoardResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> BoardResult<()> {
        self.ended = true;
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn begin(&mut self, cfg: SinkConfig) -> BoardResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BoardResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> BoardResult<()> {
        (**self).end()
    }
}
