//! Tile identities: `NAME.INDEX.SRC_WIDTH.SRC_HEIGHT`
//!
//! The identity string is the only metadata a sheet carries. It names the
//! source image a tile was cut from, the tile's row-major ordinal within that
//! image, and the source dimensions needed to rebuild it.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Field separator in the identity string
pub const SEPARATOR: char = '.';

/// Number of fields in a well-formed identity
pub const FIELD_COUNT: usize = 4;

/// Error parsing an identity string read back from a header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Not exactly four dot-separated fields
    #[error("mis-formatted sprite name '{identity}': expected 4 fields, found {found}")]
    WrongFieldCount { identity: String, found: usize },
    /// A numeric field is not a base-10 integer
    #[error("invalid {field} '{value}' in sprite name '{identity}'")]
    InvalidNumber { identity: String, field: &'static str, value: String },
    /// The name field is empty
    #[error("empty source name in sprite name '{identity}'")]
    EmptyName { identity: String },
    /// Source width or height is zero
    #[error("zero source dimension in sprite name '{identity}'")]
    ZeroDimension { identity: String },
}

/// Identity of one tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpriteIdentity {
    /// Base name of the source image (file name up to its first '.')
    pub name: String,
    /// Row-major ordinal of the tile within its source image
    pub index: u32,
    /// Width of the un-sliced source image
    pub source_width: u32,
    /// Height of the un-sliced source image
    pub source_height: u32,
}

impl SpriteIdentity {
    pub fn new(name: impl Into<String>, index: u32, source_width: u32, source_height: u32) -> Self {
        Self { name: name.into(), index, source_width, source_height }
    }

    /// Number of tile columns the source was cut into.
    ///
    /// Always derived from the source width, never from the sheet grid.
    pub fn source_columns(&self, tile_size: u32) -> u32 {
        self.source_width.div_ceil(tile_size)
    }

    /// Number of tile rows the source was cut into.
    pub fn source_rows(&self, tile_size: u32) -> u32 {
        self.source_height.div_ceil(tile_size)
    }

    /// Grid position `(column, row)` of this tile inside its source image.
    pub fn grid_position(&self, tile_size: u32) -> (u32, u32) {
        let columns = self.source_columns(tile_size).max(1);
        (self.index % columns, self.index / columns)
    }

    /// Pixel offset of this tile's top-left corner inside the source image.
    pub fn pixel_offset(&self, tile_size: u32) -> (u32, u32) {
        let (column, row) = self.grid_position(tile_size);
        (column * tile_size, row * tile_size)
    }

    /// Check `index < ceil(W/T) * ceil(H/T)`.
    pub fn index_in_range(&self, tile_size: u32) -> bool {
        let total = self.source_columns(tile_size) as u64 * self.source_rows(tile_size) as u64;
        (self.index as u64) < total
    }
}

impl fmt::Display for SpriteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.name,
            self.index,
            self.source_width,
            self.source_height,
            sep = SEPARATOR
        )
    }
}

impl FromStr for SpriteIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(IdentityError::WrongFieldCount {
                identity: s.to_string(),
                found: fields.len(),
            });
        }

        let name = fields[0];
        if name.is_empty() {
            return Err(IdentityError::EmptyName { identity: s.to_string() });
        }

        let index = parse_field(s, "index", fields[1])?;
        let source_width = parse_field(s, "source width", fields[2])?;
        let source_height = parse_field(s, "source height", fields[3])?;

        if source_width == 0 || source_height == 0 {
            return Err(IdentityError::ZeroDimension { identity: s.to_string() });
        }

        Ok(Self { name: name.to_string(), index, source_width, source_height })
    }
}

/// Parse one numeric field, tolerating surrounding whitespace and NUL padding.
fn parse_field(identity: &str, field: &'static str, value: &str) -> Result<u32, IdentityError> {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\0').parse::<u32>().map_err(|_| {
        IdentityError::InvalidNumber {
            identity: identity.to_string(),
            field,
            value: value.to_string(),
        }
    })
}

/// Base name used for identities: the file name up to its first '.'.
///
/// `hero.walk.png` becomes `hero`, so a name can never contain the separator.
pub fn base_name(file_name: &str) -> &str {
    match file_name.find(SEPARATOR) {
        Some(pos) => &file_name[..pos],
        None => file_name,
    }
}
