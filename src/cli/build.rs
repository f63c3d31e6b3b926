//! Build command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{emit_report, GlobalOptions, Settings, EXIT_ERROR, EXIT_SUCCESS};
use crate::pipeline::{build_sheet, BuildOptions};

/// Run the build command
pub(crate) fn run_build(
    tile_size: u32,
    source_dir: &Path,
    dest_dir: &Path,
    dry_run: bool,
    options: &GlobalOptions,
) -> ExitCode {
    let settings = match Settings::resolve(options, tile_size) {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let build_options = BuildOptions { parallel: settings.parallel, dry_run };
    match build_sheet(source_dir, dest_dir, &settings.format, build_options) {
        Ok(report) => {
            emit_report(&report, report.summary(), options.json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
