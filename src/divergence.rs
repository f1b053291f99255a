//! Divergence resolution stage
//!
//! Re-examines kept records grouped by identity. A group whose members
//! disagree on capture time text escaped earlier deduplication (same
//! pixels, different metadata), so it is re-counted from scratch and the
//! retention policy applied again. Consistent groups and singletons
//! produce no output.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::Result;
use crate::policy::{self, DupeAction};
use crate::record::ImageRecord;

/// Options for a divergence run
#[derive(Debug, Clone, Default)]
pub struct DivergenceOptions {
    /// How many copies of an identity to keep
    pub allowance: u64,
    /// Remove files beyond the allowance
    pub delete: bool,
}

/// Re-apply the retention policy to divergent identity groups.
pub fn run<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    options: &DivergenceOptions,
) -> Result<()> {
    // Groups keep first-seen order so reruns are reproducible.
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<ImageRecord>> = Vec::new();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = match ImageRecord::parse(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed record");
                continue;
            }
        };
        if record.deleted {
            continue;
        }
        let index = *group_index
            .entry(record.identity.clone())
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[index].push(record);
    }

    for group in groups {
        if group.len() < 2 || !is_divergent(&group) {
            continue;
        }
        for (position, mut record) in group.into_iter().enumerate() {
            let occurrence = position as u64 + 1;
            record.count = occurrence;
            if policy::resolve(occurrence, options.allowance, options.delete)
                == DupeAction::Delete
            {
                record.deleted = true;
                match fs::remove_file(&record.path) {
                    Ok(()) => {
                        debug!(path = ?record.path, occurrence, "Removed divergent duplicate")
                    }
                    Err(e) => {
                        warn!(path = ?record.path, error = %e, "Failed to remove divergent duplicate")
                    }
                }
            }
            writeln!(output, "{}", record)?;
        }
    }
    Ok(())
}

/// A group diverges when any member's capture time text differs from
/// the first member's.
fn is_divergent(group: &[ImageRecord]) -> bool {
    group
        .iter()
        .any(|record| record.time_text != group[0].time_text)
}
