//! Sprite sheet -> source images.

use super::report::{ImageResult, ItemStatus, ParseReport};
use super::PackError;
use crate::discovery::{is_supported_image, load_image};
use crate::format::TileFormat;
use crate::output::{save_png, sprite_output_path, tile_size_from_file_name};
use crate::reassemble::reassemble_all;
use crate::sheet::{decompose_sheet, is_exact_grid, sheet_grid};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Options for a parse run
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Reassemble each source image on its own rayon task
    pub parallel: bool,
}

/// Recover the source images packed into `sheet_path`.
///
/// With a destination, each image is written to `dest_dir/<name>.png`; a
/// write failure is logged and recorded, and the remaining images are still
/// written. Without one, the sheet is only decoded and reported.
///
/// Fails when the sheet cannot be read, or when a destination was given and
/// no image could be reassembled from the sheet.
pub fn parse_sheet(
    sheet_path: &Path,
    dest_dir: Option<&Path>,
    format: &TileFormat,
    options: ParseOptions,
) -> Result<ParseReport, PackError> {
    let start = Instant::now();

    if !is_supported_image(sheet_path) {
        return Err(PackError::UnsupportedFormat(sheet_path.to_path_buf()));
    }

    let sheet = load_image(sheet_path)
        .map_err(|source| PackError::Load { path: sheet_path.to_path_buf(), source })?;

    let grid = sheet_grid(&sheet, format);
    let mut report = ParseReport {
        sheet: sheet_path.to_path_buf(),
        columns: grid.columns,
        rows: grid.rows,
        ..Default::default()
    };
    info!(
        "parsing {} ({}x{} px, {}x{} cells)",
        sheet_path.display(),
        sheet.width(),
        sheet.height(),
        grid.columns,
        grid.rows
    );

    if let Some(built_with) = tile_size_from_file_name(sheet_path) {
        if built_with != format.tile_size {
            let notice = format!(
                "sheet name suggests tile size {}, parsing with {}",
                built_with, format.tile_size
            );
            warn!("{}", notice);
            report.warnings.push(notice);
        }
    }

    if !is_exact_grid(&sheet, format) {
        let notice = format!(
            "sheet size {}x{} is not a multiple of the {}x{} cell size, trailing pixels ignored",
            sheet.width(),
            sheet.height(),
            format.tile_size,
            format.cell_height()
        );
        warn!("{}", notice);
        report.warnings.push(notice);
    }

    let contents = decompose_sheet(&sheet, format);
    report.empty_cells = contents.empty_cells;
    debug!("{} tile(s), {} empty cell(s)", contents.tiles.len(), contents.empty_cells);

    for cell_error in &contents.errors {
        warn!("skipping {}", cell_error);
        report.warnings.push(cell_error.to_string());
    }

    let reassembly = reassemble_all(contents.tiles, format, options.parallel);
    for place_error in &reassembly.errors {
        warn!("skipping tile: {}", place_error);
        report.warnings.push(place_error.to_string());
    }

    if reassembly.images.is_empty() && dest_dir.is_some() {
        return Err(PackError::NoSprites(sheet_path.to_path_buf()));
    }

    for image in reassembly.images {
        let (width, height) = image.image.dimensions();
        let mut result = ImageResult {
            name: image.name,
            width,
            height,
            tiles: image.tiles_placed,
            output: None,
            status: ItemStatus::Success,
        };

        if let Some(dest) = dest_dir {
            let path = sprite_output_path(dest, &result.name);
            match save_png(&image.image, &path) {
                Ok(()) => {
                    info!("wrote {}", path.display());
                    result.output = Some(path);
                }
                Err(e) => {
                    error!("failed to write {}: {}", path.display(), e);
                    result.status = ItemStatus::Failed(format!("{}: {}", path.display(), e));
                }
            }
        }

        report.images.push(result);
    }

    report.duration = start.elapsed();
    Ok(report)
}
