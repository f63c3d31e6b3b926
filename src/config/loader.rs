//! Configuration loading and discovery for `spritepack.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::SpritepackConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for
pub const CONFIG_FILE_NAME: &str = "spritepack.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse spritepack.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the default tile size
    pub tile_size: Option<u32>,
    /// Number of parallel jobs; any value enables parallel mode
    pub jobs: Option<usize>,
}

/// Find spritepack.toml by walking up from the current working directory.
///
/// # Returns
/// - `Some(path)` if a config file is found
/// - `None` if no config file is found
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find spritepack.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a spritepack.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<SpritepackConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            tracing::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(SpritepackConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<SpritepackConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: SpritepackConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. A tile size of 0
/// leaves the configured default in place.
pub fn merge_cli_overrides(config: &mut SpritepackConfig, overrides: &CliOverrides) {
    if let Some(tile_size) = overrides.tile_size.filter(|&t| t > 0) {
        config.sheet.tile_size = tile_size;
    }

    if let Some(jobs) = overrides.jobs {
        config.build.parallel = true;
        config.build.jobs = jobs;
    }
}
