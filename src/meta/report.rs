//! Metadata reporting
//!
//! Prints selected tag values for every listed file, one line per file.
//! The `sync` action additionally copies each file's capture time onto
//! its filesystem timestamps.

use std::io::{BufRead, Write};

use tracing::warn;

use crate::error::Result;
use crate::meta::{self, TagSet};
use crate::pathlist;

/// What to report for each file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportAction {
    /// All known tags
    All,
    /// Capture time tags only
    Time,
    /// Camera make and model only
    Camera,
    /// Report capture times and copy them onto filesystem timestamps
    Sync,
}

/// Report metadata for every file listed on the input stream.
///
/// Files whose metadata cannot be read are skipped with a diagnostic;
/// output stream failures are fatal.
pub fn run<R: BufRead, W: Write>(input: R, output: &mut W, action: ReportAction) -> Result<()> {
    for path in pathlist::paths(input) {
        let path = path?;
        let tags = match meta::read_tag_set(&path) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(?path, error = %e, "Skipping file");
                continue;
            }
        };

        if action == ReportAction::Sync {
            let Some(text) = &tags.original else {
                warn!(?path, "No capture time, skipping");
                continue;
            };
            let time = match meta::parse_time(text) {
                Ok(time) => time,
                Err(e) => {
                    warn!(?path, error = %e, "Unparseable capture time, skipping");
                    continue;
                }
            };
            if let Err(e) = meta::sync_file_times(&path, time) {
                warn!(?path, error = %e, "Failed to set file times");
                continue;
            }
            writeln!(output, "{}\t{}", path.display(), text)?;
            continue;
        }

        let pairs = report_pairs(&tags, action);
        if pairs.is_empty() {
            writeln!(output, "{}", path.display())?;
        } else {
            writeln!(output, "{}\t{}", path.display(), pairs.join(" "))?;
        }
    }
    Ok(())
}

/// Collect `tag=value` pairs for the tags the action selects. Absent
/// tags produce no pair.
fn report_pairs(tags: &TagSet, action: ReportAction) -> Vec<String> {
    let want_time = matches!(action, ReportAction::All | ReportAction::Time);
    let want_camera = matches!(action, ReportAction::All | ReportAction::Camera);
    let mut pairs = Vec::new();

    if want_time {
        if let Some(value) = &tags.original {
            pairs.push(format!("original={}", value));
        }
        if let Some(value) = &tags.digitized {
            pairs.push(format!("digitized={}", value));
        }
        if let Some(value) = &tags.modified {
            pairs.push(format!("modified={}", value));
        }
    }
    if want_camera {
        if let Some(value) = &tags.make {
            pairs.push(format!("make={}", value));
        }
        if let Some(value) = &tags.model {
            pairs.push(format!("model={}", value));
        }
    }
    pairs
}
