//! Run report types.
//!
//! Contains types describing the outcome of a build or parse run. Nothing a
//! run produces is rolled back when a later item fails, so every skipped or
//! failed item is recorded here instead.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Status of a single source image or reassembled image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum ItemStatus {
    /// Processed and (unless dry-run or report-only) written
    Success,
    /// Deliberately left out, e.g. a duplicate name
    Skipped(String),
    /// Could not be processed
    Failed(String),
}

impl ItemStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ItemStatus::Failed(_))
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Success => write!(f, "success"),
            ItemStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            ItemStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Outcome for one source image of a build.
#[derive(Debug, Clone, Serialize)]
pub struct SourceResult {
    /// Base name used in the tile identities
    pub name: String,
    pub path: PathBuf,
    /// Tiles contributed to the sheet
    pub tiles: usize,
    #[serde(flatten)]
    pub status: ItemStatus,
    /// Per-tile problems (tiles that could not be encoded)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl SourceResult {
    pub fn success(name: String, path: PathBuf, tiles: usize) -> Self {
        Self { name, path, tiles, status: ItemStatus::Success, warnings: vec![] }
    }

    pub fn skipped(name: String, path: PathBuf, reason: String) -> Self {
        Self { name, path, tiles: 0, status: ItemStatus::Skipped(reason), warnings: vec![] }
    }

    pub fn failed(name: String, path: PathBuf, error: String) -> Self {
        Self { name, path, tiles: 0, status: ItemStatus::Failed(error), warnings: vec![] }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Result of a complete build run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// One entry per discovered source, in path order
    pub sources: Vec<SourceResult>,
    /// Tiles placed on the sheet
    pub tile_count: usize,
    pub columns: u32,
    pub rows: u32,
    /// Sheet width and height in pixels
    pub sheet_size: (u32, u32),
    /// Written sheet, `None` for a dry run
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    #[serde(skip)]
    pub duration: Duration,
}

impl BuildReport {
    pub fn success_count(&self) -> usize {
        self.sources.iter().filter(|s| s.status.is_success()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.sources.iter().filter(|s| matches!(s.status, ItemStatus::Skipped(_))).count()
    }

    pub fn failed_count(&self) -> usize {
        self.sources.iter().filter(|s| s.status.is_failure()).count()
    }

    /// Every problem recorded for the run, source-level and tile-level.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for source in &self.sources {
            if !source.status.is_success() {
                warnings.push(format!("{}: {}", source.path.display(), source.status));
            }
            warnings.extend(source.warnings.iter().map(|w| format!("{}: {}", source.name, w)));
        }
        warnings
    }

    /// Format a summary of the build.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let verb = if self.dry_run { "Would pack" } else { "Packed" };
        lines.push(format!(
            "{} {} tile(s) from {} image(s) into a {}x{} grid ({}x{} px) in {:?}",
            verb,
            self.tile_count,
            self.success_count(),
            self.columns,
            self.rows,
            self.sheet_size.0,
            self.sheet_size.1,
            self.duration
        ));
        if let Some(output) = &self.output {
            lines.push(format!("  -> {}", output.display()));
        }

        push_warnings(&mut lines, &self.warnings());
        lines.join("\n")
    }
}

/// Outcome for one reassembled image of a parse.
#[derive(Debug, Clone, Serialize)]
pub struct ImageResult {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tiles stitched into the image
    pub tiles: usize,
    /// Written file, `None` when parsing without a destination
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Result of a complete parse run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    pub sheet: PathBuf,
    pub columns: u32,
    pub rows: u32,
    /// Cells holding nothing but control color
    pub empty_cells: usize,
    /// Reassembled images in order of first appearance on the sheet
    pub images: Vec<ImageResult>,
    /// Cells and tiles that were skipped, plus sheet-level notices
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub duration: Duration,
}

impl ParseReport {
    pub fn written_count(&self) -> usize {
        self.images.iter().filter(|i| i.output.is_some() && i.status.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.images.iter().filter(|i| i.status.is_failure()).count()
    }

    /// Format a summary of the parse.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Recovered {} image(s) from {} ({}x{} cells, {} empty) in {:?}",
            self.images.len(),
            self.sheet.display(),
            self.columns,
            self.rows,
            self.empty_cells,
            self.duration
        )];

        for image in &self.images {
            let target = match &image.output {
                Some(path) => format!(" -> {}", path.display()),
                None => String::new(),
            };
            let status = if image.status.is_success() {
                String::new()
            } else {
                format!(" ({})", image.status)
            };
            lines.push(format!(
                "  {} {}x{}, {} tile(s){}{}",
                image.name, image.width, image.height, image.tiles, target, status
            ));
        }

        push_warnings(&mut lines, &self.warnings);
        lines.join("\n")
    }
}

/// Append at most five warnings to a summary.
fn push_warnings(lines: &mut Vec<String>, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    lines.push(format!("Warnings ({}):", warnings.len()));
    for warning in warnings.iter().take(5) {
        lines.push(format!("  - {}", warning));
    }
    if warnings.len() > 5 {
        lines.push(format!("  ... and {} more", warnings.len() - 5));
    }
}
