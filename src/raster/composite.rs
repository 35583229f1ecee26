use crate::foundation::error::{BoardError, BoardResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over with an extra global `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-in against a coverage value: the pixel survives exactly as much as `coverage` allows.
pub fn intersect(src: PremulRgba8, coverage: u8) -> PremulRgba8 {
    match coverage {
        0 => [0; 4],
        255 => src,
        c => {
            let c = u16::from(c);
            [
                mul_div255(u16::from(src[0]), c),
                mul_div255(u16::from(src[1]), c),
                mul_div255(u16::from(src[2]), c),
                mul_div255(u16::from(src[3]), c),
            ]
        }
    }
}

/// `saturation` blend of an opaque mid-grey source over `dst`.
///
/// A zero-saturation source keeps the backdrop's luminosity and drops its chroma, so covered
/// pixels become `Lum(dst)` grey. Uncovered backdrop shows the 50% grey source.
pub fn desaturate(dst: PremulRgba8) -> PremulRgba8 {
    let a = u32::from(dst[3]);
    // Rec. 601 weights as used by the W3C non-separable blend modes, on premultiplied values.
    let lum = (30 * u32::from(dst[0]) + 59 * u32::from(dst[1]) + 11 * u32::from(dst[2]) + 50) / 100;
    let grey_part = ((255 - a) * 128 + 127) / 255;
    let v = (grey_part + lum).min(255) as u8;
    [v, v, v, 255]
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> BoardResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BoardError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// `out = src ∩ mask`: writes every pixel of `out`, transparent wherever the mask is empty.
pub fn intersect_into(out: &mut [u8], src: &[u8], mask: &[u8]) -> BoardResult<()> {
    if out.len() != src.len() || out.len() != mask.len() * 4 {
        return Err(BoardError::render(
            "intersect_into expects rgba8 buffers matching a one-byte-per-pixel mask",
        ));
    }
    for ((o, s), &m) in out
        .chunks_exact_mut(4)
        .zip(src.chunks_exact(4))
        .zip(mask.iter())
    {
        o.copy_from_slice(&intersect([s[0], s[1], s[2], s[3]], m));
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
