//! Error types for the shoebox toolkit

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shoebox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the shoebox toolkit
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Failed to read metadata from {path}: {message}")]
    MetadataRead { path: PathBuf, message: String },

    #[error("Failed to save metadata to {path}: {message}")]
    MetadataSave { path: PathBuf, message: String },

    #[error("Failed to preserve original {path}: {message}")]
    Backup { path: PathBuf, message: String },

    #[error("Filesystem operation failed on {path}: {message}")]
    Filesystem { path: PathBuf, message: String },

    #[error("Malformed record line '{line}': {message}")]
    RecordParse { line: String, message: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Destination already occupied: {path}")]
    Collision { path: PathBuf },

    #[error("Chrono parse error: {0}")]
    ChronoParse(#[from] chrono::ParseError),
}
