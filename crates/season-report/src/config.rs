//! Configuration file loading for season reports.
//!
//! Settings come from `season-report.toml` in the current directory (or an
//! explicit path) and can be overridden on the command line.

use chess_insights::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Install locations probed when Stockfish is not on `PATH`.
pub const STOCKFISH_LOCATIONS: [&str; 4] = [
    "/opt/homebrew/bin/stockfish",
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/usr/games/stockfish",
];

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A setting is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Report settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Path to the Stockfish binary. Discovered when absent.
    #[serde(default)]
    pub stockfish_path: Option<PathBuf>,
    /// Search depth per evaluated position. Defaults to 15.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Evaluate every n-th move of each player. Defaults to 1.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_depth() -> u32 {
    AnalysisConfig::default().depth
}

fn default_sample_rate() -> u32 {
    AnalysisConfig::default().sample_rate
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            stockfish_path: None,
            depth: default_depth(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl ReportConfig {
    /// Loads `season-report.toml` from the current directory, falling back
    /// to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration at `path`, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns `season-report.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("season-report.toml")
    }

    /// Rejects settings the analyzer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::Invalid("depth must be at least 1".to_string()));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid(
                "sample_rate must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            depth: self.depth,
            sample_rate: self.sample_rate,
        }
    }

    /// The configured Stockfish path, or the discovered one.
    pub fn stockfish(&self) -> PathBuf {
        self.stockfish_path.clone().unwrap_or_else(discover_stockfish)
    }
}

/// Finds a Stockfish binary: `PATH` first, then [`STOCKFISH_LOCATIONS`],
/// then the bare name.
pub fn discover_stockfish() -> PathBuf {
    find_in_path(std::env::var_os("PATH").as_deref(), "stockfish")
        .or_else(|| {
            STOCKFISH_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.is_file())
        })
        .unwrap_or_else(|| PathBuf::from("stockfish"))
}

fn find_in_path(path_var: Option<&OsStr>, name: &str) -> Option<PathBuf> {
    std::env::split_paths(path_var?)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
