//! Command-line interface implementation
//!
//! This module provides the `spack` entry point and dispatches to the build
//! and parse commands.

mod build;
mod parse;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, merge_cli_overrides, CliOverrides};
use crate::format::TileFormat;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

const TIPS: &str = "\
Tips:
  - Sources may be .png, .jpg or .jpeg; sheets and recovered images are always PNG.
  - Only the top level of SOURCE_DIR is scanned, subdirectories are ignored.
  - Do not pack a sprite sheet into another sprite sheet.
  - Parse with the tile size the sheet was built with: spritesheet_30.png needs 30.
  - Base names must be unique: hero.png and hero.walk.png both become 'hero'.";

/// spack - pack images into a self-describing sprite sheet and back
#[derive(Parser)]
#[command(name = "spack")]
#[command(about = "Pack images into a sprite sheet that remembers where every tile came from")]
#[command(version, after_help = TIPS)]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use this spritepack.toml instead of searching for one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Worker threads for slicing and reassembly (enables parallel mode)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack every image in SOURCE_DIR into DEST_DIR/spritesheet_<TILE_SIZE>.png
    #[command(short_flag = 'b')]
    Build {
        /// Tile width and height in pixels (0 uses the configured default)
        tile_size: u32,

        /// Directory holding the source images
        source_dir: PathBuf,

        /// Directory the sheet is written to
        dest_dir: PathBuf,

        /// Plan the sheet without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Recover the images packed into SHEET
    #[command(short_flag = 'p')]
    Parse {
        /// Tile size the sheet was built with (0 uses the configured default)
        tile_size: u32,

        /// Sprite sheet to read
        sheet: PathBuf,

        /// Directory the images are written to; without it the sheet is only reported
        dest_dir: Option<PathBuf>,
    },
}

/// Flags shared by every command
pub(crate) struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub jobs: Option<usize>,
}

/// Settings resolved from spritepack.toml and the command line
pub(crate) struct Settings {
    pub format: TileFormat,
    pub parallel: bool,
}

impl Settings {
    /// Load the config, apply command-line overrides and size the rayon pool.
    pub fn resolve(options: &GlobalOptions, tile_size: u32) -> Result<Self, ExitCode> {
        let mut config = match load_config(options.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return Err(ExitCode::from(EXIT_ERROR));
            }
        };

        if tile_size == 0 {
            tracing::warn!("tile size 0 is not usable, using {}", config.sheet.tile_size);
        }

        let overrides = CliOverrides { tile_size: Some(tile_size), jobs: options.jobs };
        merge_cli_overrides(&mut config, &overrides);

        let format = match config.tile_format(None) {
            Ok(format) => format,
            Err(e) => {
                eprintln!("Error: invalid control color: {}", e);
                return Err(ExitCode::from(EXIT_INVALID_ARGS));
            }
        };

        if config.build.parallel && config.build.jobs > 0 {
            if let Err(e) =
                rayon::ThreadPoolBuilder::new().num_threads(config.build.jobs).build_global()
            {
                tracing::debug!("keeping existing thread pool: {}", e);
            }
        }

        tracing::debug!(
            "tile size {}, header height {}, parallel {}",
            format.tile_size,
            format.header_height,
            config.build.parallel
        );
        Ok(Self { format, parallel: config.build.parallel })
    }
}

/// Print a run report: JSON when requested, the human summary otherwise.
pub(crate) fn emit_report<R: Serialize>(report: &R, summary: String, json: bool) {
    if !json {
        println!("{}", summary);
        return;
    }

    match serde_json::to_string_pretty(report) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the -q/-v flags.
fn init_tracing(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let options = GlobalOptions { config: cli.config, json: cli.json, jobs: cli.jobs };

    match cli.command {
        Commands::Build { tile_size, source_dir, dest_dir, dry_run } => {
            build::run_build(tile_size, &source_dir, &dest_dir, dry_run, &options)
        }
        Commands::Parse { tile_size, sheet, dest_dir } => {
            parse::run_parse(tile_size, &sheet, dest_dir.as_deref(), &options)
        }
    }
}
