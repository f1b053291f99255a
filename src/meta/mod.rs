//! EXIF metadata access shared by the reporting and reconciliation stages
//!
//! Reading goes through the `exif` crate, which parses without touching
//! the file. Writing goes through `little_exif`, which rewrites only the
//! metadata segment and leaves pixel data alone, so content identities
//! survive tag edits.

pub mod reconcile;
pub mod report;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use exif::{In, Reader, Tag, Value};
use filetime::FileTime;
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Timestamp format used by EXIF date tags
pub const EXIF_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// The tag values the toolkit works with, as read from one file.
///
/// Absent tags read as `None`; a file without any metadata segment reads
/// as an entirely empty set rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    /// DateTimeOriginal: when the shutter fired
    pub original: Option<String>,
    /// DateTimeDigitized: when the image became a file
    pub digitized: Option<String>,
    /// DateTime: last modification of the image data
    pub modified: Option<String>,
    /// Camera manufacturer
    pub make: Option<String>,
    /// Camera model
    pub model: Option<String>,
}

impl TagSet {
    /// True when none of the three capture time tags is present.
    pub fn no_time_tags(&self) -> bool {
        self.original.is_none() && self.digitized.is_none() && self.modified.is_none()
    }
}

/// Read the toolkit's tag set from a file.
///
/// A file that cannot be opened is an error; a file without a readable
/// metadata container is not, it just yields an empty set.
pub fn read_tag_set(path: &Path) -> Result<TagSet> {
    let file = File::open(path).map_err(|e| Error::MetadataRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut reader = BufReader::new(file);

    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            trace!(?path, error = %e, "No readable metadata container");
            return Ok(TagSet::default());
        }
    };

    Ok(TagSet {
        original: ascii_value(&exif, Tag::DateTimeOriginal),
        digitized: ascii_value(&exif, Tag::DateTimeDigitized),
        modified: ascii_value(&exif, Tag::DateTime),
        make: ascii_value(&exif, Tag::Make),
        model: ascii_value(&exif, Tag::Model),
    })
}

/// Extract a tag as trimmed text, or None when absent or empty.
fn ascii_value(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let text = match &field.value {
        Value::Ascii(groups) => groups
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect::<Vec<_>>()
            .join(" "),
        _ => field.display_value().to_string(),
    };
    let text = text.trim_end_matches('\0').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Pending tag writes for one file. Only the populated fields are
/// written; everything else in the metadata segment is preserved.
#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub original: Option<String>,
    pub digitized: Option<String>,
    pub modified: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
}

impl TagPatch {
    /// True when there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.original.is_none()
            && self.digitized.is_none()
            && self.modified.is_none()
            && self.make.is_none()
            && self.model.is_none()
    }

    /// Write the pending tags into the file's metadata segment.
    ///
    /// Files without an existing segment get a fresh one.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut metadata = Metadata::new_from_path(path).unwrap_or_else(|_| Metadata::new());

        if let Some(value) = &self.original {
            metadata.set_tag(ExifTag::DateTimeOriginal(value.clone()));
        }
        if let Some(value) = &self.digitized {
            metadata.set_tag(ExifTag::CreateDate(value.clone()));
        }
        if let Some(value) = &self.modified {
            metadata.set_tag(ExifTag::ModifyDate(value.clone()));
        }
        if let Some(value) = &self.make {
            metadata.set_tag(ExifTag::Make(value.clone()));
        }
        if let Some(value) = &self.model {
            metadata.set_tag(ExifTag::Model(value.clone()));
        }

        metadata.write_to_file(path).map_err(|e| Error::MetadataSave {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(?path, "Saved metadata");
        Ok(())
    }
}

/// Parse EXIF timestamp text: "YYYY:MM:DD HH:MM:SS", possibly quoted.
pub fn parse_time(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim().trim_matches('"');
    Ok(NaiveDateTime::parse_from_str(text, EXIF_TIME_FORMAT)?)
}

/// Render a timestamp as EXIF tag text.
pub fn format_time(time: NaiveDateTime) -> String {
    time.format(EXIF_TIME_FORMAT).to_string()
}

/// Set a file's access and modification times to the given timestamp,
/// interpreted as UTC.
pub fn sync_file_times(path: &Path, time: NaiveDateTime) -> Result<()> {
    let file_time = FileTime::from_unix_time(time.and_utc().timestamp(), 0);
    filetime::set_file_times(path, file_time, file_time).map_err(|e| Error::Filesystem {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read a file's modification time as a naive UTC timestamp.
pub fn modified_time(path: &Path) -> Result<NaiveDateTime> {
    let metadata = path.metadata().map_err(|e| Error::Filesystem {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let modified = metadata.modified().map_err(|e| Error::Filesystem {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(DateTime::<Utc>::from(modified).naive_utc())
}
