//! PNG output and file path generation

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error writing an output image
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("could not write file: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// Save an RGBA image to a PNG file.
///
/// The PNG encoder is always used, whatever the path's extension, because
/// the sheet format relies on exact pixel values.
///
/// # Arguments
///
/// * `image` - The image to save
/// * `path` - The output file path
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(OutputError)` on failure
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// File name of a built sheet: `spritesheet_{tile_size}.png`.
pub fn sheet_file_name(tile_size: u32) -> String {
    format!("spritesheet_{}.png", tile_size)
}

/// Path of the sheet written by a build into `dest_dir`.
pub fn sheet_output_path(dest_dir: &Path, tile_size: u32) -> PathBuf {
    dest_dir.join(sheet_file_name(tile_size))
}

/// Path of a reassembled source image: `dest_dir/{name}.png`.
pub fn sprite_output_path(dest_dir: &Path, name: &str) -> PathBuf {
    dest_dir.join(format!("{}.png", name))
}

/// Tile size encoded in a sheet file name (`spritesheet_30.png` -> 30).
///
/// Used to warn when a sheet is parsed with a tile size other than the one
/// it was built with.
pub fn tile_size_from_file_name(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let (_, suffix) = stem.rsplit_once('_')?;
    suffix.parse().ok()
}
