//! Reassembly - stitching decoded tiles back into their source images
//!
//! Each tile's destination is computed from its own identity:
//! `column = index % ceil(W/T)`, `row = index / ceil(W/T)`. The column count
//! comes from the decoded source width, never from the sheet grid.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use thiserror::Error;

use crate::format::TileFormat;
use crate::sheet::DecodedTile;

/// Background of a freshly allocated output image
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Error placing one tile into its output image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    /// A tile disagrees with earlier tiles about the source dimensions
    #[error("tile '{identity}' reports source size {found_w}x{found_h}, but '{name}' is {expected_w}x{expected_h}", expected_w = expected.0, expected_h = expected.1, found_w = found.0, found_h = found.1)]
    DimensionMismatch { name: String, identity: String, expected: (u32, u32), found: (u32, u32) },
    /// The index lies outside the source's tile grid
    #[error("tile '{identity}' index is outside the {tiles}-tile grid of its source")]
    IndexOutOfRange { identity: String, tiles: u64 },
    /// The source size does not fit in memory
    #[error("tile '{identity}' reports source size {width}x{height}, which cannot be allocated")]
    ImplausibleSize { identity: String, width: u32, height: u32 },
}

/// One rebuilt source image.
#[derive(Debug, Clone)]
pub struct ReassembledImage {
    pub name: String,
    pub image: RgbaImage,
    /// Number of tiles blitted into the image
    pub tiles_placed: usize,
}

/// Outcome of reassembling a set of decoded tiles.
#[derive(Debug, Default)]
pub struct Reassembly {
    /// Images in order of first sighting on the sheet
    pub images: Vec<ReassembledImage>,
    pub errors: Vec<PlaceError>,
}

/// Incrementally rebuilds source images, one tile at a time.
#[derive(Debug)]
pub struct Reassembler {
    format: TileFormat,
    images: Vec<ReassembledImage>,
    by_name: HashMap<String, usize>,
}

impl Reassembler {
    pub fn new(format: TileFormat) -> Self {
        Self { format, images: Vec::new(), by_name: HashMap::new() }
    }

    /// Blit one tile into its output image, allocating the image on first sight.
    pub fn place(&mut self, tile: &DecodedTile) -> Result<(), PlaceError> {
        let identity = &tile.identity;
        let tile_size = self.format.tile_size;

        if !identity.index_in_range(tile_size) {
            return Err(PlaceError::IndexOutOfRange {
                identity: identity.to_string(),
                tiles: identity.source_columns(tile_size) as u64
                    * identity.source_rows(tile_size) as u64,
            });
        }

        let found = (identity.source_width, identity.source_height);
        let slot = match self.by_name.get(&identity.name) {
            Some(&slot) => {
                let expected = self.images[slot].image.dimensions();
                if expected != found {
                    return Err(PlaceError::DimensionMismatch {
                        name: identity.name.clone(),
                        identity: identity.to_string(),
                        expected,
                        found,
                    });
                }
                slot
            }
            None => {
                let bytes = (found.0 as usize)
                    .checked_mul(found.1 as usize)
                    .and_then(|pixels| pixels.checked_mul(4));
                if bytes.is_none() {
                    return Err(PlaceError::ImplausibleSize {
                        identity: identity.to_string(),
                        width: found.0,
                        height: found.1,
                    });
                }
                self.images.push(ReassembledImage {
                    name: identity.name.clone(),
                    image: RgbaImage::from_pixel(found.0, found.1, TRANSPARENT),
                    tiles_placed: 0,
                });
                self.by_name.insert(identity.name.clone(), self.images.len() - 1);
                self.images.len() - 1
            }
        };

        let (offset_x, offset_y) = identity.pixel_offset(tile_size);
        let output = &mut self.images[slot];
        blit(&mut output.image, &tile.image, offset_x, offset_y);
        output.tiles_placed += 1;

        Ok(())
    }

    /// Names seen so far, in order of first sighting.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|i| i.name.as_str())
    }

    pub fn finish(self) -> Vec<ReassembledImage> {
        self.images
    }
}

/// Copy `src` into `dest` at `(x, y)`, clipped to `dest`'s bounds.
fn blit(dest: &mut RgbaImage, src: &RgbaImage, x: u32, y: u32) {
    let width = src.width().min(dest.width().saturating_sub(x));
    let height = src.height().min(dest.height().saturating_sub(y));
    for sy in 0..height {
        for sx in 0..width {
            dest.put_pixel(x + sx, y + sy, *src.get_pixel(sx, sy));
        }
    }
}

/// Reassemble every decoded tile.
///
/// Tiles are grouped by source name first; with `parallel` set, each group
/// is rebuilt on its own rayon task. Output order is first-sighting order in
/// both modes.
pub fn reassemble_all(tiles: Vec<DecodedTile>, format: &TileFormat, parallel: bool) -> Reassembly {
    let groups = group_by_name(tiles);

    let rebuild = |group: Vec<DecodedTile>| {
        let mut reassembler = Reassembler::new(*format);
        let errors: Vec<PlaceError> =
            group.iter().filter_map(|tile| reassembler.place(tile).err()).collect();
        (reassembler.finish(), errors)
    };

    let results: Vec<(Vec<ReassembledImage>, Vec<PlaceError>)> = if parallel {
        groups.into_par_iter().map(rebuild).collect()
    } else {
        groups.into_iter().map(rebuild).collect()
    };

    let mut reassembly = Reassembly::default();
    for (images, errors) in results {
        reassembly.images.extend(images);
        reassembly.errors.extend(errors);
    }
    reassembly
}

/// Group tiles by source name, keeping first-sighting order.
fn group_by_name(tiles: Vec<DecodedTile>) -> Vec<Vec<DecodedTile>> {
    let mut groups: Vec<Vec<DecodedTile>> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for tile in tiles {
        match slots.get(&tile.identity.name) {
            Some(&slot) => groups[slot].push(tile),
            None => {
                slots.insert(tile.identity.name.clone(), groups.len());
                groups.push(vec![tile]);
            }
        }
    }

    groups
}
