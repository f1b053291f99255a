//! Content identity stage
//!
//! Reads a list of image paths, computes each file's pixel-content
//! identity, counts how often every identity has been seen and emits one
//! record per file. With deletion enabled, copies beyond the allowance
//! are removed from disk and their records marked.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::hash::{self, SENTINEL_IDENTITY};
use crate::meta;
use crate::pathlist;
use crate::policy::{self, DupeAction};
use crate::record::{ImageRecord, TIME_PLACEHOLDER};

/// Options for an identity run
#[derive(Debug, Clone, Default)]
pub struct IdentityOptions {
    /// Seed occurrence counts from a previous run's records
    pub preload: Option<PathBuf>,
    /// How many copies of an identity to keep
    pub allowance: u64,
    /// Remove files beyond the allowance
    pub delete: bool,
}

/// Emit one record per listed file, counting identity occurrences.
pub fn run<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    options: &IdentityOptions,
) -> Result<()> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    if let Some(preload) = &options.preload {
        seed_counts(preload, &mut counts);
    }

    for path in pathlist::paths(input) {
        let path = path?;
        let identity = identity_of(&path);
        let count = counts.entry(identity.clone()).or_insert(0);
        *count += 1;
        let occurrence = *count;

        let time_text = capture_time_text(&path);
        let mut deleted = false;
        if policy::resolve(occurrence, options.allowance, options.delete) == DupeAction::Delete {
            deleted = true;
            match fs::remove_file(&path) {
                Ok(()) => debug!(?path, occurrence, "Removed duplicate"),
                Err(e) => warn!(?path, error = %e, "Failed to remove duplicate"),
            }
        }

        let record = ImageRecord {
            identity,
            count: occurrence,
            time_text,
            path,
            deleted,
        };
        writeln!(output, "{}", record)?;
    }
    Ok(())
}

/// Pixel digest of the file, or the sentinel when it cannot be decoded.
fn identity_of(path: &Path) -> String {
    match hash::pixel_digest(path) {
        Ok(digest) => digest,
        Err(e) => {
            warn!(?path, error = %e, "Cannot decode, using sentinel identity");
            SENTINEL_IDENTITY.to_string()
        }
    }
}

/// Capture time tag text, or the placeholder when unavailable.
fn capture_time_text(path: &Path) -> String {
    match meta::read_tag_set(path) {
        Ok(tags) => tags
            .original
            .unwrap_or_else(|| TIME_PLACEHOLDER.to_string()),
        Err(e) => {
            debug!(?path, error = %e, "No readable metadata");
            TIME_PLACEHOLDER.to_string()
        }
    }
}

/// Seed occurrence counts from a previous run's records. Every record
/// still kept registers one occurrence of its identity, so files already
/// present elsewhere count against the allowance; delete-marked records
/// are excluded so resolved duplicates do not re-inflate counts.
/// Malformed records are ignored and a missing file only warns, leaving
/// the counts empty.
fn seed_counts(preload: &Path, counts: &mut HashMap<String, u64>) {
    let content = match fs::read_to_string(preload) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = ?preload, error = %e, "Cannot read preload records");
            return;
        }
    };

    let mut seeded = 0u64;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match ImageRecord::parse(line) {
            Ok(record) if record.deleted => continue,
            Ok(record) => {
                *counts.entry(record.identity).or_insert(0) += 1;
                seeded += 1;
            }
            Err(e) => warn!(error = %e, "Ignoring malformed preload record"),
        }
    }
    info!(path = ?preload, seeded, "Seeded occurrence counts");
}
