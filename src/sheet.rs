//! Sheet composition and decomposition - tiles in a fixed grid
//!
//! The sheet is filled with the control color before tiles are placed, so
//! unused cells decode as empty background and short tiles keep their
//! control-color padding.

use image::{imageops, RgbaImage};
use thiserror::Error;

use crate::format::TileFormat;
use crate::header::decode_header;
use crate::identity::{IdentityError, SpriteIdentity};
use crate::layout::{plan_grid, GridSize};
use crate::slicer::Tile;

/// Compose tiles into one sheet, left to right and top to bottom.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use spritepack::format::TileFormat;
/// use spritepack::sheet::compose_sheet;
/// use spritepack::slicer::slice_image;
///
/// let format = TileFormat::new(30);
/// let image = RgbaImage::from_pixel(64, 64, Rgba([0, 128, 0, 255]));
/// let sliced = slice_image(&image, "hero", &format);
///
/// let sheet = compose_sheet(&sliced.tiles, &format);
/// assert_eq!(sheet.dimensions(), (90, 93));
/// ```
pub fn compose_sheet(tiles: &[Tile], format: &TileFormat) -> RgbaImage {
    let grid = plan_grid(tiles.len() as u32);
    let (sheet_width, sheet_height) = sheet_dimensions(grid, format);
    let mut sheet = RgbaImage::from_pixel(sheet_width, sheet_height, format.control_color);

    for (i, tile) in tiles.iter().enumerate() {
        let column = (i as u32) % grid.columns;
        let row = (i as u32) / grid.columns;

        let dest_x = column * format.tile_size;
        let dest_y = row * format.cell_height();

        let width = tile.image.width().min(format.tile_size);
        let height = tile.image.height().min(format.cell_height());
        for y in 0..height {
            for x in 0..width {
                sheet.put_pixel(dest_x + x, dest_y + y, *tile.image.get_pixel(x, y));
            }
        }
    }

    sheet
}

/// Pixel size of a sheet holding `grid`.
pub fn sheet_dimensions(grid: GridSize, format: &TileFormat) -> (u32, u32) {
    (grid.columns * format.tile_size, grid.rows * format.cell_height())
}

/// Grid that fits inside a sheet; partial trailing cells are ignored.
pub fn sheet_grid(sheet: &RgbaImage, format: &TileFormat) -> GridSize {
    GridSize {
        columns: sheet.width() / format.tile_size,
        rows: sheet.height() / format.cell_height(),
    }
}

/// Whether the sheet's size is an exact multiple of the cell size.
pub fn is_exact_grid(sheet: &RgbaImage, format: &TileFormat) -> bool {
    sheet.width() % format.tile_size == 0 && sheet.height() % format.cell_height() == 0
}

/// A tile recovered from a sheet, trimmed of its header and padding.
#[derive(Debug, Clone)]
pub struct DecodedTile {
    pub identity: SpriteIdentity,
    pub image: RgbaImage,
}

/// Why a non-empty cell was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellErrorKind {
    /// The header decoded but the content region is all control color
    #[error("malformed sprite: content is entirely control color")]
    MalformedSprite,
    /// The header does not follow the identity grammar
    #[error(transparent)]
    MalformedIdentity(#[from] IdentityError),
    /// The identity claims a source that needs more tiles than the sheet has cells
    #[error("source size {width}x{height} needs {tiles} tiles, the sheet only has {cells} cells")]
    ImplausibleSize { width: u32, height: u32, tiles: u64, cells: u32 },
}

/// A skipped sheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cell ({column}, {row}) '{header}': {kind}")]
pub struct CellError {
    pub column: u32,
    pub row: u32,
    /// Decoded header text
    pub header: String,
    pub kind: CellErrorKind,
}

/// Everything recovered from one sheet.
#[derive(Debug, Default)]
pub struct SheetContents {
    /// Decoded tiles in row-major cell order
    pub tiles: Vec<DecodedTile>,
    /// Cells with a header that could not be used
    pub errors: Vec<CellError>,
    /// Background cells with no header
    pub empty_cells: usize,
}

/// Walk a sheet's grid and decode every tile.
///
/// Errors are collected per cell; decomposition never stops early.
pub fn decompose_sheet(sheet: &RgbaImage, format: &TileFormat) -> SheetContents {
    let grid = sheet_grid(sheet, format);
    let mut contents = SheetContents::default();

    for row in 0..grid.rows {
        for column in 0..grid.columns {
            let cell = imageops::crop_imm(
                sheet,
                column * format.tile_size,
                row * format.cell_height(),
                format.tile_size,
                format.cell_height(),
            )
            .to_image();

            let header = decode_header(&cell, format);
            if header.is_empty() {
                contents.empty_cells += 1;
                continue;
            }

            let cell_error =
                |kind: CellErrorKind| CellError { column, row, header: header.clone(), kind };

            let Some(image) = trim_tile(&cell, format) else {
                contents.errors.push(cell_error(CellErrorKind::MalformedSprite));
                continue;
            };

            let identity = match header.parse::<SpriteIdentity>() {
                Ok(identity) => identity,
                Err(e) => {
                    contents.errors.push(cell_error(e.into()));
                    continue;
                }
            };

            // Every tile of a source was packed onto this sheet
            let tiles = identity.source_columns(format.tile_size) as u64
                * identity.source_rows(format.tile_size) as u64;
            if tiles > grid.cells() as u64 {
                contents.errors.push(cell_error(CellErrorKind::ImplausibleSize {
                    width: identity.source_width,
                    height: identity.source_height,
                    tiles,
                    cells: grid.cells(),
                }));
                continue;
            }

            contents.tiles.push(DecodedTile { identity, image });
        }
    }

    contents
}

/// Strip the header band and trailing control-color padding from a cell.
///
/// Width is measured along the first content row and height down the first
/// content column, each up to the first control-color pixel. Returns `None`
/// when either is zero.
pub fn trim_tile(cell: &RgbaImage, format: &TileFormat) -> Option<RgbaImage> {
    let top = format.header_height;
    let max_width = format.tile_size.min(cell.width());
    let max_bottom = format.cell_height().min(cell.height());
    if top >= max_bottom {
        return None;
    }

    let width =
        (0..max_width).take_while(|&x| !format.is_control(cell.get_pixel(x, top))).count() as u32;
    let height =
        (top..max_bottom).take_while(|&y| !format.is_control(cell.get_pixel(0, y))).count() as u32;

    if width == 0 || height == 0 {
        return None;
    }

    Some(imageops::crop_imm(cell, 0, top, width, height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::write_header;
    use crate::slicer::slice_image;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    /// A cell with a custom header and `content` pixels of content
    fn cell_with_header(header: &str, content: (u32, u32), format: &TileFormat) -> RgbaImage {
        let mut cell =
            RgbaImage::from_pixel(format.tile_size, format.cell_height(), format.control_color);
        for y in 0..content.1 {
            for x in 0..content.0 {
                cell.put_pixel(x, y + format.header_height, GREEN);
            }
        }
        write_header(&mut cell, header, format).unwrap();
        cell
    }

    #[test]
    fn test_compose_dimensions_and_background() {
        let format = TileFormat::new(30);
        let sliced = slice_image(&solid(64, 64, RED), "hero", &format);
        let sheet = compose_sheet(&sliced.tiles, &format);

        assert_eq!(sheet.dimensions(), (90, 93));
        // Header of the first tile at the sheet origin
        assert_eq!(decode_header(&sheet, &format), "hero.0.64.64");
        // Content of tile 0
        assert_eq!(*sheet.get_pixel(0, 1), RED);
        // Padding of the short bottom-right tile
        assert_eq!(*sheet.get_pixel(89, 92), format.control_color);
    }

    #[test]
    fn test_compose_places_row_major() {
        let format = TileFormat::new(4);
        let tiles: Vec<Tile> = (0..3)
            .map(|i| {
                let color = Rgba([i as u8, 0, 0, 255]);
                slice_image(&solid(4, 4, color), &format!("t{}", i), &format).tiles.remove(0)
            })
            .collect();

        // 3 tiles -> 1 column x 3 rows
        let sheet = compose_sheet(&tiles, &format);
        assert_eq!(sheet.dimensions(), (4, 15));
        assert_eq!(*sheet.get_pixel(0, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*sheet.get_pixel(0, 6), Rgba([1, 0, 0, 255]));
        assert_eq!(*sheet.get_pixel(0, 11), Rgba([2, 0, 0, 255]));
    }

    #[test]
    fn test_compose_empty() {
        let sheet = compose_sheet(&[], &TileFormat::new(8));
        assert_eq!(sheet.dimensions(), (0, 0));
    }

    #[test]
    fn test_unused_cells_are_control_color() {
        let format = TileFormat::new(10);
        // 3 tiles -> 1 column x 3 rows, no spare cells
        let sliced = slice_image(&solid(20, 10, RED), "pair", &format);
        let mut tiles = sliced.tiles;
        tiles.extend(slice_image(&solid(10, 10, GREEN), "one", &format).tiles);
        assert_eq!(tiles.len(), 3);

        let sheet = compose_sheet(&tiles, &format);
        let contents = decompose_sheet(&sheet, &format);
        assert_eq!(contents.tiles.len(), 3);
        assert_eq!(contents.empty_cells, 0);

        // 5 tiles -> 2 x 3, one spare cell
        let five: Vec<Tile> = (0..5)
            .map(|i| slice_image(&solid(10, 10, RED), &format!("s{}", i), &format).tiles.remove(0))
            .collect();
        let sheet = compose_sheet(&five, &format);
        assert_eq!(sheet.dimensions(), (20, 33));
        let contents = decompose_sheet(&sheet, &format);
        assert_eq!(contents.tiles.len(), 5);
        assert_eq!(contents.empty_cells, 1);
    }

    #[test]
    fn test_decompose_round_trip() {
        let format = TileFormat::new(30);
        let sliced = slice_image(&solid(64, 64, RED), "hero", &format);
        let sheet = compose_sheet(&sliced.tiles, &format);
        let contents = decompose_sheet(&sheet, &format);

        assert!(contents.errors.is_empty());
        assert_eq!(contents.tiles.len(), 9);
        for (i, tile) in contents.tiles.iter().enumerate() {
            assert_eq!(tile.identity, SpriteIdentity::new("hero", i as u32, 64, 64));
        }
        // Full, short-column, short-row and corner tiles
        assert_eq!(contents.tiles[0].image.dimensions(), (30, 30));
        assert_eq!(contents.tiles[2].image.dimensions(), (4, 30));
        assert_eq!(contents.tiles[6].image.dimensions(), (30, 4));
        assert_eq!(contents.tiles[8].image.dimensions(), (4, 4));
    }

    #[test]
    fn test_trim_full_tile() {
        let format = TileFormat::new(6);
        let cell = cell_with_header("a.0.6.6", (6, 6), &format);
        assert_eq!(trim_tile(&cell, &format).unwrap().dimensions(), (6, 6));
    }

    #[test]
    fn test_trim_short_tile() {
        let format = TileFormat::new(6);
        let cell = cell_with_header("a.0.6.6", (2, 5), &format);
        let trimmed = trim_tile(&cell, &format).unwrap();
        assert_eq!(trimmed.dimensions(), (2, 5));
        assert!(trimmed.pixels().all(|p| *p == GREEN));
    }

    #[test]
    fn test_trim_all_control_is_none() {
        let format = TileFormat::new(6);
        let cell = cell_with_header("a.0.6.6", (0, 0), &format);
        assert!(trim_tile(&cell, &format).is_none());
    }

    #[test]
    fn test_trim_with_taller_header() {
        let format = TileFormat::new(4).with_header_height(2);
        let cell = cell_with_header("a.0.4.4", (3, 4), &format);
        assert_eq!(trim_tile(&cell, &format).unwrap().dimensions(), (3, 4));
    }

    #[test]
    fn test_malformed_identity_is_skipped() {
        let format = TileFormat::new(6);
        let sheet = cell_with_header("abc", (6, 6), &format);
        let contents = decompose_sheet(&sheet, &format);

        assert!(contents.tiles.is_empty());
        assert_eq!(contents.errors.len(), 1);
        let err = &contents.errors[0];
        assert_eq!((err.column, err.row), (0, 0));
        assert_eq!(err.header, "abc");
        assert!(matches!(
            err.kind,
            CellErrorKind::MalformedIdentity(IdentityError::WrongFieldCount { found: 1, .. })
        ));
        assert!(err.to_string().contains("mis-formatted"));
    }

    #[test]
    fn test_malformed_sprite_is_skipped() {
        let format = TileFormat::new(6);
        let sheet = cell_with_header("a.0.6.6", (0, 0), &format);
        let contents = decompose_sheet(&sheet, &format);

        assert!(contents.tiles.is_empty());
        assert_eq!(contents.errors[0].kind, CellErrorKind::MalformedSprite);
    }

    #[test]
    fn test_non_numeric_identity_is_skipped() {
        let format = TileFormat::new(8);
        let sheet = cell_with_header("a.one.6.6", (6, 6), &format);
        let contents = decompose_sheet(&sheet, &format);
        assert!(matches!(
            contents.errors[0].kind,
            CellErrorKind::MalformedIdentity(IdentityError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_size_larger_than_sheet_is_skipped() {
        let format = TileFormat::new(6);
        // 7x6 needs two tiles, a one-cell sheet cannot hold them
        let sheet = cell_with_header("a.0.7.6", (6, 6), &format);
        let contents = decompose_sheet(&sheet, &format);

        assert!(contents.tiles.is_empty());
        assert_eq!(
            contents.errors[0].kind,
            CellErrorKind::ImplausibleSize { width: 7, height: 6, tiles: 2, cells: 1 }
        );

        let format = TileFormat::new(30);
        let sheet = cell_with_header("a.0.4294967295.4294967295", (6, 6), &format);
        let contents = decompose_sheet(&sheet, &format);
        assert!(contents.tiles.is_empty());
        assert!(matches!(contents.errors[0].kind, CellErrorKind::ImplausibleSize { .. }));
    }

    #[test]
    fn test_partial_trailing_cells_ignored() {
        let format = TileFormat::new(30);
        let sliced = slice_image(&solid(30, 30, RED), "one", &format);
        let sheet = compose_sheet(&sliced.tiles, &format);

        let mut padded = RgbaImage::from_pixel(45, 40, format.control_color);
        for (x, y, p) in sheet.enumerate_pixels() {
            padded.put_pixel(x, y, *p);
        }

        assert!(!is_exact_grid(&padded, &format));
        assert_eq!(sheet_grid(&padded, &format), GridSize { columns: 1, rows: 1 });
        let contents = decompose_sheet(&padded, &format);
        assert_eq!(contents.tiles.len(), 1);
    }
}
