//! Tile geometry and the reserved control color
//!
//! Every component that touches pixels receives a [`TileFormat`] explicitly.
//! Building and parsing a sheet must use the same format, otherwise headers
//! are read from the wrong rows and tiles land in the wrong places.

use image::Rgba;

/// Default tile width and height in pixels
pub const DEFAULT_TILE_SIZE: u32 = 30;

/// Height of the header band above each tile in pixels
pub const DEFAULT_HEADER_HEIGHT: u32 = 1;

/// The "no data" color: sheet background, tile padding and header terminator
pub const DEFAULT_CONTROL_COLOR: Rgba<u8> = Rgba([239, 11, 244, 255]);

/// Number of identity bytes stored in one header pixel (R, G and B).
///
/// Alpha is left alone because re-encoding can shift the color channels of
/// partially transparent pixels.
pub const BYTES_PER_PIXEL: usize = 3;

/// Geometry shared by the slicer, composer, decomposer and reassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileFormat {
    /// Width and height of a tile's content area
    pub tile_size: u32,
    /// Rows reserved above the content for the encoded identity
    pub header_height: u32,
    /// Reserved sentinel color
    pub control_color: Rgba<u8>,
}

impl Default for TileFormat {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            header_height: DEFAULT_HEADER_HEIGHT,
            control_color: DEFAULT_CONTROL_COLOR,
        }
    }
}

impl TileFormat {
    /// Create a format with the default header height and control color.
    ///
    /// # Panics
    ///
    /// Panics if `tile_size` is 0. Every grid computation divides by it.
    pub fn new(tile_size: u32) -> Self {
        assert!(tile_size > 0, "tile size must be at least 1 pixel");
        Self { tile_size, ..Default::default() }
    }

    pub fn with_header_height(mut self, header_height: u32) -> Self {
        self.header_height = header_height;
        self
    }

    pub fn with_control_color(mut self, color: Rgba<u8>) -> Self {
        self.control_color = color;
        self
    }

    /// Height of one grid cell: header band plus content.
    pub fn cell_height(&self) -> u32 {
        self.tile_size + self.header_height
    }

    /// Maximum identity length in bytes that fits in the header row.
    pub fn header_capacity(&self) -> usize {
        self.tile_size as usize * BYTES_PER_PIXEL
    }

    /// Number of tiles needed to cover `extent` pixels along one axis.
    pub fn tiles_along(&self, extent: u32) -> u32 {
        extent.div_ceil(self.tile_size)
    }

    pub fn is_control(&self, pixel: &Rgba<u8>) -> bool {
        *pixel == self.control_color
    }
}
