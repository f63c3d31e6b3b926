//! In-band header codec
//!
//! A tile's identity string is packed into the first row of its header band,
//! three bytes per pixel in the R, G and B channels. The first pixel equal to
//! the control color terminates the string; a row that starts with the
//! control color is empty background.

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::format::{TileFormat, BYTES_PER_PIXEL};

/// Error encoding an identity into a header row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The identity needs more pixels than the tile is wide
    #[error("cannot encode '{identity}': requires {required} header pixels, tile size is {available}")]
    Capacity { identity: String, required: usize, available: usize },
    /// A packed pixel equals the control color and would read back as a terminator
    #[error("cannot encode '{identity}': header pixel {pixel} collides with the control color")]
    ControlColorCollision { identity: String, pixel: usize },
    /// Nothing to encode
    #[error("cannot encode an empty identity")]
    Empty,
}

/// Number of header pixels needed for `len` identity bytes.
pub fn pixels_required(len: usize) -> usize {
    len.div_ceil(BYTES_PER_PIXEL)
}

/// Encode an identity string into one header row of `tile_size` pixels.
///
/// Pixels past the packed identity are the control color. A trailing partial
/// pixel is padded with zero bytes, which [`decode_header`] strips again.
pub fn encode_header(identity: &str, format: &TileFormat) -> Result<Vec<Rgba<u8>>, HeaderError> {
    let bytes = identity.as_bytes();
    if bytes.is_empty() {
        return Err(HeaderError::Empty);
    }

    let required = pixels_required(bytes.len());
    let available = format.tile_size as usize;
    if required > available {
        return Err(HeaderError::Capacity { identity: identity.to_string(), required, available });
    }

    let mut row = vec![format.control_color; available];
    for (x, chunk) in bytes.chunks(BYTES_PER_PIXEL).enumerate() {
        let r = chunk[0];
        let g = chunk.get(1).copied().unwrap_or(0);
        let b = chunk.get(2).copied().unwrap_or(0);
        let pixel = Rgba([r, g, b, 255]);

        if format.is_control(&pixel) {
            return Err(HeaderError::ControlColorCollision {
                identity: identity.to_string(),
                pixel: x,
            });
        }
        row[x] = pixel;
    }

    Ok(row)
}

/// Stamp `identity` into the header band of a tile surface.
///
/// Row 0 receives the packed identity; any further header rows are filled
/// with the control color. The tile must be at least `tile_size` wide and
/// `header_height` tall.
pub fn write_header(
    tile: &mut RgbaImage,
    identity: &str,
    format: &TileFormat,
) -> Result<(), HeaderError> {
    let row = encode_header(identity, format)?;

    for (x, pixel) in row.into_iter().enumerate() {
        tile.put_pixel(x as u32, 0, pixel);
    }
    for y in 1..format.header_height {
        for x in 0..format.tile_size {
            tile.put_pixel(x, y, format.control_color);
        }
    }

    Ok(())
}

/// Read the raw identity bytes from row 0 of a cell.
///
/// Scanning stops at the first control-color pixel or after `tile_size`
/// pixels. Trailing zero padding is removed.
pub fn decode_header_bytes(cell: &RgbaImage, format: &TileFormat) -> Vec<u8> {
    let width = format.tile_size.min(cell.width());
    let mut bytes = Vec::with_capacity(width as usize * BYTES_PER_PIXEL);

    if cell.height() == 0 {
        return bytes;
    }

    for x in 0..width {
        let pixel = cell.get_pixel(x, 0);
        if format.is_control(pixel) {
            break;
        }
        bytes.extend_from_slice(&pixel.0[..BYTES_PER_PIXEL]);
    }

    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    bytes
}

/// Read the identity string from row 0 of a cell.
///
/// An empty string means the cell is background filler, not a tile.
pub fn decode_header(cell: &RgbaImage, format: &TileFormat) -> String {
    String::from_utf8_lossy(&decode_header_bytes(cell, format)).into_owned()
}
