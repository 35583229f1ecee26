use crate::foundation::core::Canvas;
use crate::foundation::error::{BoardError, BoardResult};

/// One output frame in RGBA8, row-major, `width * height * 4` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Transparent premultiplied frame sized to `canvas`.
    pub fn new(canvas: Canvas) -> BoardResult<Self> {
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba_len()?],
            premultiplied: true,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy for encoders that expect it.
    pub fn to_straight_image(&self) -> BoardResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| BoardError::render("frame buffer does not match its dimensions"))
    }
}

pub(crate) fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
