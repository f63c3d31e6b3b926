//! Parse command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{emit_report, GlobalOptions, Settings, EXIT_ERROR, EXIT_SUCCESS};
use crate::pipeline::{parse_sheet, ParseOptions};

/// Run the parse command
pub(crate) fn run_parse(
    tile_size: u32,
    sheet: &Path,
    dest_dir: Option<&Path>,
    options: &GlobalOptions,
) -> ExitCode {
    let settings = match Settings::resolve(options, tile_size) {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    if dest_dir.is_none() {
        tracing::info!("no destination given, reporting only");
    }

    let parse_options = ParseOptions { parallel: settings.parallel };
    match parse_sheet(sheet, dest_dir, &settings.format, parse_options) {
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
