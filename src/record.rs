//! The tab-separated record format shared by the pipeline stages
//!
//! Each line carries five fields:
//! `identity <TAB> count <TAB> capture time <TAB> path <TAB> action`
//! where the action field is either empty or the delete marker.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Marker placed in the action field of records whose file was removed.
pub const DELETE_MARKER: &str = "***delete***";

/// Stand-in capture time for files without a readable capture time tag.
pub const TIME_PLACEHOLDER: &str = "----:--:-- --:--:--";

/// Counts are displayed clamped to two digits.
pub const DISPLAY_COUNT_CAP: u64 = 99;

/// One pipeline record describing a single image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Content identity, or a sentinel for undecodable files
    pub identity: String,
    /// How many times this identity has been seen so far
    pub count: u64,
    /// Capture time text, or the placeholder when unavailable
    pub time_text: String,
    /// Path of the file this record describes
    pub path: PathBuf,
    /// Whether the file was removed by a previous stage
    pub deleted: bool,
}

/// Clamp a running count to the displayable range.
pub fn display_count(count: u64) -> u64 {
    count.min(DISPLAY_COUNT_CAP)
}

impl ImageRecord {
    /// Parse one record line.
    ///
    /// The path field may itself contain tabs, so the tail of the line is
    /// split from the right: everything after the last tab is the action
    /// field. A line missing the trailing tab is accepted with an empty
    /// action.
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = |message: &str| Error::RecordParse {
            line: line.to_string(),
            message: message.to_string(),
        };

        let mut fields = line.splitn(4, '\t');
        let identity = fields.next().ok_or_else(|| malformed("empty line"))?;
        let count_text = fields
            .next()
            .ok_or_else(|| malformed("missing count field"))?;
        let time_text = fields
            .next()
            .ok_or_else(|| malformed("missing capture time field"))?;
        let rest = fields
            .next()
            .ok_or_else(|| malformed("missing path field"))?;

        if identity.is_empty() {
            return Err(malformed("empty identity field"));
        }
        let count: u64 = count_text
            .parse()
            .map_err(|_| malformed("count is not an integer"))?;

        let (path, action) = match rest.rsplit_once('\t') {
            Some((path, action)) => (path, action),
            None => (rest, ""),
        };
        if path.is_empty() {
            return Err(malformed("empty path field"));
        }
        let deleted = match action {
            "" => false,
            DELETE_MARKER => true,
            _ => return Err(malformed("unrecognized action field")),
        };

        Ok(ImageRecord {
            identity: identity.to_string(),
            count,
            time_text: time_text.to_string(),
            path: PathBuf::from(path),
            deleted,
        })
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:02}\t{}\t{}\t{}",
            self.identity,
            display_count(self.count),
            self.time_text,
            self.path.display(),
            if self.deleted { DELETE_MARKER } else { "" }
        )
    }
}
