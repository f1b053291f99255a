//! Configuration types for the shoebox toolkit

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default filename template for organized files.
///
/// `{model}` and `{size}` expand to short hex fragments of the camera
/// model and file size; the rest is strftime syntax applied to the
/// capture time.
pub const DEFAULT_TEMPLATE: &str = "%Y%m%d_%H%M%S_{model}{size}";

/// Where the camera-model folder sits relative to the date folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelPlacement {
    /// No model folder
    #[default]
    None,
    /// Model folder above the date folders: base/MODEL/YYYY/...
    Before,
    /// Model folder below the date folders: base/YYYY/.../MODEL/
    After,
}

/// How finely capture times are split into folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// No date folders - everything under the base directory
    All,
    /// By year: YYYY/
    Year,
    /// By year and month: YYYY/MM/
    Month,
    /// By year and ISO-style week number: YYYY/WW/
    Week,
    /// By year, week and weekday: YYYY/WW/Mon/
    DayOfWeek,
    /// By year, month and day: YYYY/MM/DD/ (default)
    #[default]
    Day,
}

/// Configuration for the shoebox toolkit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File extensions treated as photos when scanning
    pub extensions: Vec<String>,

    /// How many copies of an identity to keep before deletion applies
    pub duplicate_allowance: u64,

    /// Base directory for organized output
    pub organize_base: PathBuf,

    /// Where the camera-model folder sits in organized paths
    pub model_placement: ModelPlacement,

    /// Date folder granularity for organized paths
    pub granularity: Granularity,

    /// Filename template for organized files
    pub template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".into(), "jpeg".into()],
            duplicate_allowance: 1,
            organize_base: PathBuf::from("organized"),
            model_placement: ModelPlacement::default(),
            granularity: Granularity::default(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Config {
    /// Check if a file extension is a supported photo format
    pub fn is_photo(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.extensions.iter().any(|e| e == &ext_lower)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Shoebox Configuration File
# This file uses TOML format (https://toml.io)

# File extensions treated as photos when scanning
extensions = ["jpg", "jpeg"]

# How many copies of an identity to keep before deletion applies
duplicate_allowance = 1

# Base directory for organized output
organize_base = "organized"

# Camera-model folder placement: "none", "before", or "after"
# - none: no model folder (default)
# - before: base/MODEL/YYYY/...
# - after: base/YYYY/.../MODEL/
model_placement = "none"

# Date folder granularity: "all", "year", "month", "week",
# "day-of-week", or "day"
# - all: everything directly under the base directory
# - year: YYYY/
# - month: YYYY/MM/
# - week: YYYY/WW/
# - day-of-week: YYYY/WW/Mon/
# - day: YYYY/MM/DD/ (default)
granularity = "day"

# Filename template for organized files
# strftime specifiers are applied to the capture time;
# {model} and {size} expand to short hex fragments
template = "%Y%m%d_%H%M%S_{model}{size}"
"#
        .to_string()
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}
