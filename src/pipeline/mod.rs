//! File-level pipelines
//!
//! - [`build_sheet`]: directory of images -> `spritesheet_<T>.png`
//! - [`parse_sheet`]: sheet file -> one `<name>.png` per source image
//!
//! Both degrade per item: an unreadable source, an unencodable tile, a
//! malformed cell or a failed write is logged, recorded in the run report and
//! skipped. A [`PackError`] is returned only when the run as a whole cannot
//! produce anything.

pub mod build;
pub mod parse;
pub mod report;

pub use build::{build_sheet, BuildOptions};
pub use parse::{parse_sheet, ParseOptions};
pub use report::{BuildReport, ImageResult, ItemStatus, ParseReport, SourceResult};

use crate::discovery::DiscoveryError;
use crate::output::OutputError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a whole build or parse run
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackError {
    /// Source directory missing or unreadable
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// Source directory holds no supported images
    #[error("no images found in {}", .0.display())]
    NoImages(PathBuf),
    /// Every source was skipped or produced no encodable tile
    #[error("no tiles could be encoded from the images in {}", .0.display())]
    NoTiles(PathBuf),
    /// Sheet path does not end in .png, .jpg or .jpeg
    #[error("unsupported sheet format: {} (expected .png, .jpg or .jpeg)", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Image could not be opened or decoded
    #[error("failed to read {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Sheet could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
    /// No cell of the sheet decoded to a sprite
    #[error("no sprites found in {}", .0.display())]
    NoSprites(PathBuf),
}
