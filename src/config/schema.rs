//! Configuration schema types for `spritepack.toml`
//!
//! Defines the structure and validation rules for the sheet format and build
//! settings.

use crate::color::{parse_color, to_hex, ColorError};
use crate::format::{TileFormat, DEFAULT_CONTROL_COLOR, DEFAULT_HEADER_HEIGHT, DEFAULT_TILE_SIZE};
use serde::{Deserialize, Serialize};

/// Sheet geometry section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Tile size used when the command line passes 0
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Rows reserved above each tile for its identity
    #[serde(default = "default_header_height")]
    pub header_height: u32,
    /// Reserved sentinel color (hex or CSS)
    #[serde(default = "default_control_color")]
    pub control_color: String,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_header_height() -> u32 {
    DEFAULT_HEADER_HEIGHT
}

fn default_control_color() -> String {
    to_hex(DEFAULT_CONTROL_COLOR)
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            header_height: default_header_height(),
            control_color: default_control_color(),
        }
    }
}

/// Build settings section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Slice sources and reassemble images on a rayon pool
    #[serde(default)]
    pub parallel: bool,
    /// Worker threads for the pool (0 = rayon default)
    #[serde(default)]
    pub jobs: usize,
}

/// Complete spritepack.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpritepackConfig {
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "sheet.tile_size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spritepack.toml: '{}' {}", self.field, self.message)
    }
}

impl SpritepackConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.sheet.tile_size == 0 {
            errors.push(ConfigValidationError {
                field: "sheet.tile_size".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.sheet.header_height == 0 {
            errors.push(ConfigValidationError {
                field: "sheet.header_height".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if let Err(e) = parse_color(&self.sheet.control_color) {
            errors.push(ConfigValidationError {
                field: "sheet.control_color".to_string(),
                message: format!("is not a valid color: {}", e),
            });
        }

        errors
    }

    /// Check if the configuration is valid
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Tile format for this configuration.
    ///
    /// A `tile_size` of `None` or `Some(0)` uses `sheet.tile_size`.
    pub fn tile_format(&self, tile_size: Option<u32>) -> Result<TileFormat, ColorError> {
        let control_color = parse_color(&self.sheet.control_color)?;
        let tile_size = tile_size.filter(|&t| t > 0).unwrap_or(self.sheet.tile_size);

        Ok(TileFormat::new(tile_size)
            .with_header_height(self.sheet.header_height)
            .with_control_color(control_color))
    }
}
