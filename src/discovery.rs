//! Source image discovery and loading.
//!
//! Sweeps a single directory (non-recursive) for `.png`, `.jpg` and `.jpeg`
//! files, matching extensions case-insensitively.

use glob::{glob, Pattern};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted as sheet sources and as sheets to parse
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Error during source discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The source directory does not exist or is not a directory
    #[error("image directory does not exist: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, #[source] glob::PatternError),
}

/// Check if a path has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Find all supported images directly inside `dir`.
///
/// # Returns
/// Matching file paths, sorted so builds are reproducible.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    // Escape the directory so brackets and stars in real paths match literally
    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    let paths = glob(&pattern).map_err(|e| DiscoveryError::InvalidPattern(pattern.clone(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() && is_supported_image(&path) {
                    files.push(path);
                }
            }
            Err(e) => {
                // Log but continue on unreadable entries
                tracing::warn!("error reading path: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Load an image from disk as 8-bit RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage, image::ImageError> {
    Ok(image::open(path)?.to_rgba8())
}
