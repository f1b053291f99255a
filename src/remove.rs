//! Deletion stage
//!
//! Removes every file listed on the input stream, then prunes
//! directories left empty beneath a base path. Individual failures are
//! reported and skipped so one stubborn file cannot block the rest.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::pathlist;

/// Remove the listed files, then prune empty directories under the root.
pub fn run<R: BufRead>(input: R, root: &Path) -> Result<()> {
    for path in pathlist::paths(input) {
        let path = path?;
        match fs::remove_file(&path) {
            Ok(()) => debug!(?path, "Removed file"),
            Err(e) => warn!(?path, error = %e, "Failed to remove file"),
        }
    }
    prune_empty_dirs(root)
}

/// Remove directories under the root that are empty, deepest first so a
/// chain of empty parents collapses in one pass. The root itself stays.
fn prune_empty_dirs(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() || entry.path() == root {
            continue;
        }
        let is_empty = match fs::read_dir(entry.path()) {
            Ok(mut contents) => contents.next().is_none(),
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Cannot inspect directory");
                continue;
            }
        };
        if is_empty {
            match fs::remove_dir(entry.path()) {
                Ok(()) => debug!(path = ?entry.path(), "Pruned empty directory"),
                Err(e) => debug!(path = ?entry.path(), error = %e, "Failed to prune directory"),
            }
        } else {
            trace!(path = ?entry.path(), "Directory not empty");
        }
    }
    Ok(())
}
