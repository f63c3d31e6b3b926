//! Control color parsing
//!
//! `spritepack.toml` may give the control color as hex (`#RGB`, `#RGBA`,
//! `#RRGGBB`, `#RRGGBBAA`) or as any CSS color understood by lightningcss
//! (`rgb(239 11 244)`, `magenta`, ...).

use image::Rgba;
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// Parse a color string into RGBA.
///
/// # Examples
///
/// ```
/// use spritepack::color::parse_color;
///
/// assert_eq!(parse_color("#EF0BF4").unwrap(), image::Rgba([239, 11, 244, 255]));
/// assert_eq!(parse_color("rgb(239 11 244)").unwrap(), image::Rgba([239, 11, 244, 255]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    match s.strip_prefix('#') {
        Some(hex) => parse_hex_color(hex),
        None => parse_css_color(s),
    }
}

/// Format a color as `#RRGGBBAA`.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
}

/// Parse the digits of a hex color (without the leading '#').
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ColorError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    // Short forms double each digit: #F0A -> #FF00AA
    let channels: Vec<u8> = match hex.len() {
        3 | 4 => hex.bytes().map(|d| hex_value(d) * 17).collect(),
        6 | 8 => {
            hex.as_bytes().chunks(2).map(|pair| hex_value(pair[0]) * 16 + hex_value(pair[1])).collect()
        }
        len => return Err(ColorError::InvalidLength(len)),
    };

    let alpha = channels.get(3).copied().unwrap_or(255);
    Ok(Rgba([channels[0], channels[1], channels[2], alpha]))
}

/// Value of an ASCII hex digit already validated by the caller.
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Parse a CSS color using lightningcss (rgb, hsl, hwb, named colors, ...)
fn parse_css_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    use lightningcss::values::color::FloatColor;

    let css_color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;

    // Convert to sRGB first, then read the channels
    let rgb_color = css_color
        .to_rgb()
        .map_err(|_| ColorError::CssParse("cannot convert color to RGB".to_string()))?;

    match rgb_color {
        CssColor::RGBA(rgba) => Ok(Rgba([rgba.red, rgba.green, rgba.blue, rgba.alpha])),
        CssColor::Float(float_color) => match float_color.as_ref() {
            FloatColor::RGB(rgb) => {
                let channel = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
                Ok(Rgba([channel(rgb.r), channel(rgb.g), channel(rgb.b), channel(rgb.alpha)]))
            }
            _ => Err(ColorError::CssParse("unexpected float color format".to_string())),
        },
        _ => Err(ColorError::CssParse("color conversion did not produce RGB".to_string())),
    }
}
