//! Image slicing - cuts a source image into fixed-size, self-describing tiles
//!
//! Tiles are produced row-major. The running counter assigned to each tile
//! is the index the reassembler later inverts with
//! [`SpriteIdentity::grid_position`], so both sides must agree on the tile
//! size and derive the column count from the source width.

use image::RgbaImage;

use crate::format::TileFormat;
use crate::header::{write_header, HeaderError};
use crate::identity::SpriteIdentity;

/// One tile: an identity plus a `T x (T + header)` surface.
#[derive(Debug, Clone)]
pub struct Tile {
    pub identity: SpriteIdentity,
    pub image: RgbaImage,
}

impl Tile {
    /// The identity string stamped into this tile's header.
    pub fn key(&self) -> String {
        self.identity.to_string()
    }
}

/// Result of slicing one source image.
#[derive(Debug, Default)]
pub struct SlicedImage {
    /// Tiles in row-major order
    pub tiles: Vec<Tile>,
    /// Tiles dropped because their header could not be encoded
    pub rejected: Vec<HeaderError>,
}

/// Source rectangle `(x, y, width, height)` of a tile, clamped to the image.
///
/// Trailing tiles on the right and bottom edges may be short on either axis.
pub fn tile_bounds(
    column: u32,
    row: u32,
    image_width: u32,
    image_height: u32,
    tile_size: u32,
) -> (u32, u32, u32, u32) {
    let x = (column * tile_size).min(image_width);
    let y = (row * tile_size).min(image_height);
    let right = (x + tile_size).min(image_width);
    let bottom = (y + tile_size).min(image_height);
    (x, y, right - x, bottom - y)
}

/// Cut `image` into tiles named after `name`.
///
/// Each tile is filled with the control color, receives its slice of the
/// source directly below the header band, and carries the identity
/// `name.index.width.height` in its header row.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use spritepack::format::TileFormat;
/// use spritepack::slicer::slice_image;
///
/// let image = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 255]));
/// let sliced = slice_image(&image, "hero", &TileFormat::new(30));
/// assert_eq!(sliced.tiles.len(), 9);
/// assert_eq!(sliced.tiles[4].key(), "hero.4.64.64");
/// ```
pub fn slice_image(image: &RgbaImage, name: &str, format: &TileFormat) -> SlicedImage {
    let (width, height) = image.dimensions();
    let tile_size = format.tile_size;
    let total_rows = format.tiles_along(height);
    let total_columns = format.tiles_along(width);

    let mut result = SlicedImage::default();
    let mut index = 0u32;

    for row in 0..total_rows {
        for column in 0..total_columns {
            let identity = SpriteIdentity::new(name, index, width, height);
            index += 1;

            let mut tile =
                RgbaImage::from_pixel(tile_size, format.cell_height(), format.control_color);

            let (src_x, src_y, src_w, src_h) = tile_bounds(column, row, width, height, tile_size);
            for y in 0..src_h {
                for x in 0..src_w {
                    let pixel = *image.get_pixel(src_x + x, src_y + y);
                    tile.put_pixel(x, y + format.header_height, pixel);
                }
            }

            match write_header(&mut tile, &identity.to_string(), format) {
                Ok(()) => result.tiles.push(Tile { identity, image: tile }),
                Err(e) => result.rejected.push(e),
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::decode_header;
    use image::Rgba;

    /// Image where every pixel encodes its own coordinates
    fn coordinate_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn test_tile_bounds_clamp() {
        assert_eq!(tile_bounds(0, 0, 64, 64, 30), (0, 0, 30, 30));
        assert_eq!(tile_bounds(2, 0, 64, 64, 30), (60, 0, 4, 30));
        assert_eq!(tile_bounds(2, 2, 64, 64, 30), (60, 60, 4, 4));
        assert_eq!(tile_bounds(1, 1, 60, 60, 30), (30, 30, 30, 30));
    }

    #[test]
    fn test_slice_64_by_30_gives_nine_tiles() {
        let format = TileFormat::new(30);
        let sliced = slice_image(&coordinate_image(64, 64), "hero", &format);

        assert_eq!(sliced.tiles.len(), 9);
        assert!(sliced.rejected.is_empty());
        for (i, tile) in sliced.tiles.iter().enumerate() {
            assert_eq!(tile.identity, SpriteIdentity::new("hero", i as u32, 64, 64));
            assert_eq!(tile.image.dimensions(), (30, 31));
            assert_eq!(decode_header(&tile.image, &format), tile.key());
        }
    }

    #[test]
    fn test_tile_content_sits_below_header() {
        let format = TileFormat::new(30);
        let image = coordinate_image(64, 64);
        let sliced = slice_image(&image, "hero", &format);

        // Tile 4 is row 1, column 1
        let tile = &sliced.tiles[4].image;
        assert_eq!(*tile.get_pixel(0, 1), Rgba([30, 30, 7, 255]));
        assert_eq!(*tile.get_pixel(29, 30), Rgba([59, 59, 7, 255]));
    }

    #[test]
    fn test_short_tiles_padded_with_control_color() {
        let format = TileFormat::new(30);
        let sliced = slice_image(&coordinate_image(64, 64), "hero", &format);

        // Bottom-right tile only holds 4x4 source pixels
        let tile = &sliced.tiles[8].image;
        assert_eq!(*tile.get_pixel(3, 4), Rgba([63, 63, 7, 255]));
        assert_eq!(*tile.get_pixel(4, 1), format.control_color);
        assert_eq!(*tile.get_pixel(0, 5), format.control_color);
        assert_eq!(*tile.get_pixel(29, 30), format.control_color);
    }

    #[test]
    fn test_exact_multiple_has_no_short_tiles() {
        let format = TileFormat::new(16);
        let sliced = slice_image(&coordinate_image(32, 48), "a", &format);

        assert_eq!(sliced.tiles.len(), 6);
        for tile in &sliced.tiles {
            // Last content pixel is real data, not padding
            assert!(!format.is_control(tile.image.get_pixel(15, 16)));
        }
    }

    #[test]
    fn test_one_pixel_over_adds_one_short_column() {
        let format = TileFormat::new(16);
        let sliced = slice_image(&coordinate_image(33, 32), "a", &format);

        // 3 columns x 2 rows, the third column is one pixel wide
        assert_eq!(sliced.tiles.len(), 6);
        let short = &sliced.tiles[2].image;
        assert!(!format.is_control(short.get_pixel(0, 1)));
        assert!(format.is_control(short.get_pixel(1, 1)));
        let full = &sliced.tiles[1].image;
        assert!(!format.is_control(full.get_pixel(15, 1)));
    }

    #[test]
    fn test_index_is_row_major() {
        let format = TileFormat::new(10);
        let sliced = slice_image(&coordinate_image(25, 25), "grid", &format);

        for tile in &sliced.tiles {
            let (column, row) = tile.identity.grid_position(format.tile_size);
            assert_eq!(tile.identity.index, row * 3 + column);
            // First content pixel matches the source origin of that cell
            let expected = Rgba([(column * 10) as u8, (row * 10) as u8, 7, 255]);
            assert_eq!(*tile.image.get_pixel(0, 1), expected);
        }
    }

    #[test]
    fn test_capacity_rejections() {
        // 2-pixel header holds at most 6 bytes; "hero.0.5.5" is 10
        let format = TileFormat::new(2);
        let sliced = slice_image(&coordinate_image(5, 5), "hero", &format);

        assert!(sliced.tiles.is_empty());
        assert_eq!(sliced.rejected.len(), 9);
        assert!(matches!(sliced.rejected[0], HeaderError::Capacity { required: 4, .. }));
    }

    #[test]
    fn test_transparent_pixels_copied_verbatim() {
        let format = TileFormat::new(4);
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let sliced = slice_image(&image, "ghost", &format);
        assert_eq!(*sliced.tiles[0].image.get_pixel(0, 1), Rgba([0, 0, 0, 0]));
    }
}
