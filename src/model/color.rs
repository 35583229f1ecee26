use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{BoardError, BoardResult};

/// Parse a CSS-style hex colour (`#RGB`, `#RRGGBB` or `#RRGGBBAA`) into premultiplied RGBA8.
pub fn parse_hex_color(s: &str) -> BoardResult<Rgba8Premul> {
    let s = s.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> BoardResult<u8> {
        let invalid = || BoardError::validation(format!("invalid hex byte \"{pair}\""));
        // `from_str_radix` tolerates a leading sign.
        if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u8::from_str_radix(pair, 16).map_err(|_| invalid())
    }

    if !hex.is_ascii() {
        return Err(BoardError::validation(format!(
            "hex colour must be ASCII, got \"{s}\""
        )));
    }

    let (r, g, b, a) = match hex.len() {
        3 => {
            let expand = |i: usize| hex_byte(&hex[i..i + 1].repeat(2));
            (expand(0)?, expand(1)?, expand(2)?, 255)
        }
        6 => (
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            hex_byte(&hex[6..8])?,
        ),
        _ => {
            return Err(BoardError::validation(format!(
                "hex colour must be #RGB, #RRGGBB or #RRGGBBAA, got \"{s}\""
            )));
        }
    };

    Ok(Rgba8Premul::from_straight_rgba(r, g, b, a))
}
