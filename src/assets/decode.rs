use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{BoardError, BoardResult};
use crate::foundation::math::Fnv1a64;

/// Decoded bitmap in premultiplied RGBA8.
///
/// The `image::RgbaImage` container is reused for its buffer and cropping helpers; its channels
/// are premultiplied, not straight.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels (> 0).
    pub width: u32,
    /// Height in pixels (> 0).
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels.
    pub premul: Arc<image::RgbaImage>,
    /// Hash of the encoded bytes; feeds layer invalidation keys.
    pub fingerprint: u64,
}

impl PreparedImage {
    /// Wrap an already premultiplied buffer.
    pub fn from_premul(premul: image::RgbaImage) -> BoardResult<Self> {
        let (width, height) = premul.dimensions();
        if width == 0 || height == 0 {
            return Err(BoardError::asset("image has zero width or height"));
        }
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u32(width);
        hasher.write_u32(height);
        hasher.write_bytes(premul.as_raw());
        Ok(Self {
            width,
            height,
            premul: Arc::new(premul),
            fingerprint: hasher.finish(),
        })
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> BoardResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let mut rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(BoardError::asset("decoded image has zero width or height"));
    }
    premultiply_rgba8_in_place(&mut rgba);

    let mut hasher = Fnv1a64::new_default();
    hasher.write_bytes(bytes);
    Ok(PreparedImage {
        width: rgba.width(),
        height: rgba.height(),
        premul: Arc::new(rgba),
        fingerprint: hasher.finish(),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
