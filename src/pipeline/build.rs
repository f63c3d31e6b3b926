//! Directory -> sprite sheet.

use super::report::{BuildReport, SourceResult};
use super::PackError;
use crate::discovery::{discover_images, load_image};
use crate::format::TileFormat;
use crate::identity::base_name;
use crate::layout::plan_grid;
use crate::output::{save_png, sheet_output_path};
use crate::sheet::{compose_sheet, sheet_dimensions};
use crate::slicer::{slice_image, SlicedImage, Tile};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Options for a build run
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Load and slice sources on the rayon pool
    pub parallel: bool,
    /// Plan the sheet without writing it
    pub dry_run: bool,
}

/// A source that survived name checks, waiting to be sliced.
struct Candidate {
    name: String,
    path: PathBuf,
}

/// Pack every supported image in `source_dir` into one sheet.
///
/// Sources are processed in path order. A source is skipped (and recorded in
/// the report) when it cannot be read, when its base name is empty, or when
/// an earlier source already used the same base name. Tiles whose identity
/// does not fit the header row are dropped.
///
/// The sheet is written to `dest_dir/spritesheet_<T>.png` unless
/// `options.dry_run` is set.
pub fn build_sheet(
    source_dir: &Path,
    dest_dir: &Path,
    format: &TileFormat,
    options: BuildOptions,
) -> Result<BuildReport, PackError> {
    let start = Instant::now();
    let mut report = BuildReport { dry_run: options.dry_run, ..Default::default() };

    let paths = discover_images(source_dir)?;
    if paths.is_empty() {
        return Err(PackError::NoImages(source_dir.to_path_buf()));
    }
    info!("found {} image(s) in {}", paths.len(), source_dir.display());

    let candidates = select_candidates(paths, &mut report);

    let slice_one = |candidate: &Candidate| -> Result<SlicedImage, String> {
        let image = load_image(&candidate.path).map_err(|e| e.to_string())?;
        debug!("slicing {} ({}x{})", candidate.path.display(), image.width(), image.height());
        Ok(slice_image(&image, &candidate.name, format))
    };

    let sliced: Vec<Result<SlicedImage, String>> = if options.parallel {
        candidates.par_iter().map(slice_one).collect()
    } else {
        candidates.iter().map(slice_one).collect()
    };

    let mut tiles: Vec<Tile> = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    for (candidate, outcome) in candidates.into_iter().zip(sliced) {
        let sliced = match outcome {
            Ok(sliced) => sliced,
            Err(e) => {
                warn!("skipping {}: {}", candidate.path.display(), e);
                report.sources.push(SourceResult::failed(candidate.name, candidate.path, e));
                continue;
            }
        };

        let mut warnings: Vec<String> = Vec::new();
        for rejected in &sliced.rejected {
            warn!("{}: {}", candidate.path.display(), rejected);
            warnings.push(rejected.to_string());
        }

        let mut placed = 0;
        for tile in sliced.tiles {
            let key = tile.key();
            if !seen_keys.insert(key.clone()) {
                warn!("duplicate tile identity '{}', keeping the first", key);
                warnings.push(format!("duplicate tile identity '{}'", key));
                continue;
            }
            tiles.push(tile);
            placed += 1;
        }

        report.sources.push(
            SourceResult::success(candidate.name, candidate.path, placed).with_warnings(warnings),
        );
    }

    if tiles.is_empty() {
        return Err(PackError::NoTiles(source_dir.to_path_buf()));
    }

    let grid = plan_grid(tiles.len() as u32);
    report.tile_count = tiles.len();
    report.columns = grid.columns;
    report.rows = grid.rows;
    report.sheet_size = sheet_dimensions(grid, format);
    info!(
        "placing {} tile(s) on a {}x{} grid ({}x{} px)",
        tiles.len(),
        grid.columns,
        grid.rows,
        report.sheet_size.0,
        report.sheet_size.1
    );

    if !options.dry_run {
        let sheet = compose_sheet(&tiles, format);
        let path = sheet_output_path(dest_dir, format.tile_size);
        save_png(&sheet, &path).map_err(|source| PackError::Write { path: path.clone(), source })?;
        info!("wrote {}", path.display());
        report.output = Some(path);
    }

    report.duration = start.elapsed();
    Ok(report)
}

/// Derive base names and drop sources whose name is empty or already taken.
fn select_candidates(paths: Vec<PathBuf>, report: &mut BuildReport) -> Vec<Candidate> {
    let mut names: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for path in paths {
        let file_name =
            path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let name = base_name(&file_name).to_string();

        if name.is_empty() {
            warn!("skipping {}: file name has no base name", path.display());
            report.sources.push(SourceResult::skipped(name, path, "empty base name".to_string()));
            continue;
        }

        if !names.insert(name.clone()) {
            warn!("skipping {}: another image is already named '{}'", path.display(), name);
            let reason = format!("duplicate name '{}'", name);
            report.sources.push(SourceResult::skipped(name, path, reason));
            continue;
        }

        candidates.push(Candidate { name, path });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ItemStatus;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use tempfile::TempDir;

    fn write_image(dir: &Path, file: &str, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([40, 80, 120, 255]))
            .save(dir.join(file))
            .unwrap();
    }

    #[test]
    fn test_build_single_image() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write_image(src.path(), "hero.png", 64, 64);

        let report =
            build_sheet(src.path(), dest.path(), &TileFormat::new(30), BuildOptions::default())
                .unwrap();

        assert_eq!(report.tile_count, 9);
        assert_eq!((report.columns, report.rows), (3, 3));
        assert_eq!(report.sheet_size, (90, 93));

        let output = report.output.unwrap();
        assert_eq!(output, dest.path().join("spritesheet_30.png"));
        assert_eq!(image::open(&output).unwrap().to_rgba8().dimensions(), (90, 93));
    }

    #[test]
    fn test_build_dry_run_writes_nothing() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write_image(src.path(), "a.png", 10, 10);

        let options = BuildOptions { dry_run: true, ..Default::default() };
        let report = build_sheet(src.path(), dest.path(), &TileFormat::new(30), options).unwrap();

        assert_eq!(report.tile_count, 1);
        assert!(report.output.is_none());
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_build_skips_duplicate_base_names() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write_image(src.path(), "hero.png", 10, 10);
        write_image(src.path(), "hero.walk.png", 10, 10);

        let report =
            build_sheet(src.path(), dest.path(), &TileFormat::new(30), BuildOptions::default())
                .unwrap();

        assert_eq!(report.tile_count, 1);
        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.sources[0].status, ItemStatus::Success);
        assert!(matches!(report.sources[1].status, ItemStatus::Skipped(_)));
    }

    #[test]
    fn test_build_skips_unreadable_image() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write_image(src.path(), "good.png", 10, 10);
        fs::write(src.path().join("broken.png"), b"not an image").unwrap();

        let report =
            build_sheet(src.path(), dest.path(), &TileFormat::new(30), BuildOptions::default())
                .unwrap();

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.tile_count, 1);
    }

    #[test]
    fn test_build_drops_tiles_too_small_for_header() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        // "a_rather_long_name.0.8.8" needs 8 header pixels, tile is 4 wide
        write_image(src.path(), "a_rather_long_name.png", 8, 8);

        let result =
            build_sheet(src.path(), dest.path(), &TileFormat::new(4), BuildOptions::default());
        assert!(matches!(result, Err(PackError::NoTiles(_))));
    }

    #[test]
    fn test_build_empty_directory() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(src.path().join("notes.txt"), "hi").unwrap();

        let result =
            build_sheet(src.path(), dest.path(), &TileFormat::new(30), BuildOptions::default());
        assert!(matches!(result, Err(PackError::NoImages(_))));
    }

    #[test]
    fn test_build_missing_directory() {
        let dest = TempDir::new().unwrap();
        let result = build_sheet(
            &dest.path().join("missing"),
            dest.path(),
            &TileFormat::new(30),
            BuildOptions::default(),
        );
        assert!(matches!(result, Err(PackError::Discovery(_))));
    }

    #[test]
    fn test_parallel_build_matches_sequential() {
        let src = TempDir::new().unwrap();
        let seq_dest = TempDir::new().unwrap();
        let par_dest = TempDir::new().unwrap();
        for (i, size) in [(50, 20), (7, 90), (31, 31), (60, 60)].iter().enumerate() {
            let image =
                RgbaImage::from_fn(size.0, size.1, |x, y| Rgba([x as u8, y as u8, i as u8, 255]));
            image.save(src.path().join(format!("img{}.png", i))).unwrap();
        }

        let format = TileFormat::new(30);
        let seq =
            build_sheet(src.path(), seq_dest.path(), &format, BuildOptions::default()).unwrap();
        let par_options = BuildOptions { parallel: true, ..Default::default() };
        let par = build_sheet(src.path(), par_dest.path(), &format, par_options).unwrap();

        assert_eq!(seq.tile_count, par.tile_count);
        let seq_sheet = image::open(seq.output.unwrap()).unwrap().to_rgba8();
        let par_sheet = image::open(par.output.unwrap()).unwrap().to_rgba8();
        assert_eq!(seq_sheet, par_sheet);
    }
}
