//! Recursive photo discovery
//!
//! Walks a directory tree and prints the photo files it finds, sorted,
//! one path per line. Sorted output keeps downstream occurrence counts
//! stable between runs.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;

/// Print every photo file under the root, sorted by path.
pub fn run<W: Write>(root: &Path, config: &Config, output: &mut W) -> Result<()> {
    let mut found: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_photo_path(entry.path(), config) {
            found.push(entry.into_path());
        }
    }
    found.sort();

    info!(?root, count = found.len(), "Scan complete");
    for path in &found {
        writeln!(output, "{}", path.display())?;
    }
    Ok(())
}

fn is_photo_path(path: &Path, config: &Config) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| config.is_photo(ext))
}
