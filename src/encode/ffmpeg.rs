use std::io::{Read as _, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BoardError, BoardResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// MP4 output options.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// Straight RGB that transparent frame areas are flattened onto.
    pub background: [u8; 3],
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: [0, 0, 0],
        }
    }
}

struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

/// Streams opaque RGBA frames into a system `ffmpeg` process (libx264, yuv420p).
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    cfg: Option<SinkConfig>,
    encoder: Option<Encoder>,
    scratch: Vec<u8>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            cfg: None,
            encoder: None,
            scratch: Vec::new(),
            last_idx: None,
        }
    }

    fn spawn(&self, cfg: &SinkConfig) -> BoardResult<Encoder> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .arg(if self.opts.overwrite { "-y" } else { "-n" })
            .args(["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"])
            .args(["-s", &format!("{}x{}", cfg.width, cfg.height)])
            .args(["-r", &format!("{}/{}", cfg.fps.num, cfg.fps.den)])
            .args(["-i", "pipe:0", "-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .args(["-movflags", "+faststart"])
            .arg(&self.opts.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| BoardError::render(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BoardError::render("ffmpeg stdin unavailable"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| BoardError::render("ffmpeg stderr unavailable"))?;
        let drain = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });
        Ok(Encoder {
            child,
            stdin: Some(stdin),
            stderr: Some(drain),
        })
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> BoardResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(BoardError::validation("ffmpeg sink width/height must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(BoardError::validation(
                "ffmpeg sink width/height must be even for yuv420p output",
            ));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(BoardError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if let Some(parent) = self
            .opts
            .out_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        if !is_ffmpeg_on_path() {
            return Err(BoardError::render(
                "ffmpeg is required for MP4 output but was not found on PATH",
            ));
        }

        self.encoder = Some(self.spawn(&cfg)?);
        self.scratch = vec![0; cfg.width as usize * cfg.height as usize * 4];
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BoardResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| BoardError::render("ffmpeg sink not started"))?;
        if self.last_idx.is_some_and(|last| idx.0 <= last.0) {
            return Err(BoardError::render("ffmpeg sink received out-of-order frame"));
        }
        if (frame.width, frame.height) != (cfg.width, cfg.height)
            || frame.data.len() != self.scratch.len()
        {
            return Err(BoardError::render(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.last_idx = Some(idx);

        flatten_onto(&mut self.scratch, frame, self.opts.background);
        let stdin = self
            .encoder
            .as_mut()
            .and_then(|enc| enc.stdin.as_mut())
            .ok_or_else(|| BoardError::render("ffmpeg sink already finished"))?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| BoardError::render(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn end(&mut self) -> BoardResult<()> {
        let mut enc = self
            .encoder
            .take()
            .ok_or_else(|| BoardError::render("ffmpeg sink not started"))?;
        drop(enc.stdin.take());
        let status = enc
            .child
            .wait()
            .map_err(|e| BoardError::render(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match enc.stderr.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| BoardError::render("ffmpeg stderr reader panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        self.cfg = None;
        if !status.success() {
            return Err(BoardError::render(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        tracing::info!(out = %self.opts.out_path.display(), "mp4 written");
        Ok(())
    }
}

/// Composite `frame` over an opaque background into `dst` as straight, opaque RGBA.
fn flatten_onto(dst: &mut [u8], frame: &FrameRGBA, background: [u8; 3]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(frame.data.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let inv = 255 - a;
        for c in 0..3 {
            let src = if frame.premultiplied {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (src + mul_div255_u16(u16::from(background[c]), inv)).min(255) as u8;
        }
        d[3] = 255;
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
