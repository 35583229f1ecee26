use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::engine::board_engine::BoardEngine;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{BoardError, BoardResult};

/// What a stopped loop hands back.
pub struct LoopExit<S> {
    pub engine: BoardEngine,
    pub sink: S,
    pub frames: u64,
    /// First error raised by the engine or the sink; the loop stops on it.
    pub error: Option<BoardError>,
}

/// Drives [`BoardEngine::tick`] on a dedicated thread at a fixed rate, pushing every frame into
/// a [`FrameSink`].
///
/// The engine and sink move into the loop and come back from [`FrameLoop::stop`], so nothing
/// else can touch them while frames are produced. Dropping a running loop cancels and joins it.
pub struct FrameLoop<S: FrameSink + 'static> {
    cancel: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
    handle: Option<JoinHandle<LoopExit<S>>>,
}

impl<S: FrameSink + 'static> FrameLoop<S> {
    pub fn spawn(engine: BoardEngine, fps: Fps, sink: S) -> BoardResult<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let frames = Arc::new(AtomicU64::new(0));
        let handle = std::thread::Builder::new()
            .name("pixelboard-frame-loop".to_string())
            .spawn({
                let cancel = Arc::clone(&cancel);
                let frames = Arc::clone(&frames);
                move || run(engine, fps, sink, &cancel, &frames)
            })
            .map_err(|e| BoardError::render(format!("failed to spawn frame loop: {e}")))?;
        tracing::info!(fps = fps.as_f64(), "frame loop started");
        Ok(Self {
            cancel,
            frames,
            handle: Some(handle),
        })
    }

    /// Frames pushed so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// False once the loop exited on its own (engine or sink error).
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel and wait for the loop thread. Returns once no further frame can be produced.
    pub fn stop(mut self) -> BoardResult<LoopExit<S>> {
        self.cancel.store(true, Ordering::Release);
        let handle = self
            .handle
            .take()
            .ok_or_else(|| BoardError::render("frame loop already stopped"))?;
        let exit = handle
            .join()
            .map_err(|_| BoardError::render("frame loop thread panicked"))?;
        tracing::info!(frames = exit.frames, "frame loop stopped");
        Ok(exit)
    }
}

impl<S: FrameSink + 'static> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run<S: FrameSink>(
    mut engine: BoardEngine,
    fps: Fps,
    mut sink: S,
    cancel: &AtomicBool,
    frames: &AtomicU64,
) -> LoopExit<S> {
    let canvas = engine.canvas();
    let mut idx = 0u64;
    let mut error = sink
        .begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
        })
        .err();

    let start = Instant::now();
    while error.is_none() && !cancel.load(Ordering::Acquire) {
        let pushed = engine
            .tick(start.elapsed())
            .and_then(|frame| sink.push_frame(FrameIndex(idx), frame));
        if let Err(e) = pushed {
            tracing::warn!(frame = idx, error = %e, "frame loop aborted");
            error = Some(e);
            break;
        }
        idx += 1;
        frames.store(idx, Ordering::Relaxed);

        let due = start + fps.frame_start(idx);
        if let Some(wait) = due.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    if let Err(e) = sink.end()
        && error.is_none()
    {
        error = Some(e);
    }
    LoopExit {
        engine,
        sink,
        frames: idx,
        error,
    }
}
