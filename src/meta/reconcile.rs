//! Capture time reconciliation
//!
//! Adjusts or assigns the EXIF capture time tags of listed files. Two
//! modes, mutually exclusive: a signed delta shifts existing capture
//! times, a base date assigns fresh ones to files that have none. Camera
//! make and model can be filled in alongside either mode.

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::meta::{self, TagPatch, EXIF_TIME_FORMAT};
use crate::pathlist;

/// Suffix appended to a file's name when preserving the original.
pub const BACKUP_SUFFIX: &str = "_original";

lazy_static! {
    /// Full EXIF timestamp: YYYY:MM:DD HH:MM:SS
    static ref BASEDATE_FULL: Regex =
        Regex::new(r"^\d{4}:\d{2}:\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
    /// Date only: YYYY:MM:DD
    static ref BASEDATE_DATE: Regex = Regex::new(r"^\d{4}:\d{2}:\d{2}$").unwrap();
    /// Compact date: YYYYMMDD
    static ref BASEDATE_COMPACT: Regex = Regex::new(r"^\d{8}$").unwrap();
    /// Clock-style adjustment: HH:MM or HH:MM:SS
    static ref CLOCK: Regex = Regex::new(r"^(\d{2}):(\d{2})(?::(\d{2}))?$").unwrap();
}

/// A signed capture time adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    seconds: i64,
}

impl Delta {
    /// The adjustment in seconds, negative for backwards shifts.
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Render as signed HH:MM:SS.
    pub fn canonical(&self) -> String {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        let magnitude = self.seconds.abs();
        format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            magnitude / 3600,
            magnitude % 3600 / 60,
            magnitude % 60
        )
    }
}

/// Parse an adjustment argument.
///
/// An optional leading `+` or `-` is followed by either a clock form
/// (`HH:MM` or `HH:MM:SS`) or a digit run: one or two digits are hours,
/// four are HHMM, six are HHMMSS. Anything else is rejected; values are
/// taken at face value without range checks.
pub fn normalize_delta(text: &str) -> Result<Delta> {
    let trimmed = text.trim();
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let invalid = || Error::Validation(format!("unrecognized time adjustment '{}'", text));
    let int = |s: &str| s.parse::<i64>().unwrap_or(0);

    let (hours, minutes, seconds) = if body.contains(':') {
        let captures = CLOCK.captures(body).ok_or_else(invalid)?;
        let seconds = captures.get(3).map_or(0, |m| int(m.as_str()));
        (int(&captures[1]), int(&captures[2]), seconds)
    } else {
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        match body.len() {
            1 | 2 => (int(body), 0, 0),
            4 => (int(&body[..2]), int(&body[2..4]), 0),
            6 => (int(&body[..2]), int(&body[2..4]), int(&body[4..6])),
            _ => return Err(invalid()),
        }
    };

    Ok(Delta {
        seconds: sign * (hours * 3600 + minutes * 60 + seconds),
    })
}

/// Parse a base date argument into a timestamp.
///
/// Accepts a full EXIF timestamp, a date (`YYYY:MM:DD`), or a compact
/// date (`YYYYMMDD`); bare dates get a noon clock so small adjustments
/// cannot cross into a neighboring day. Unusable input is reported and
/// ignored rather than treated as fatal.
pub fn normalize_basedate(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    let full = if BASEDATE_FULL.is_match(trimmed) {
        trimmed.to_string()
    } else if BASEDATE_DATE.is_match(trimmed) {
        format!("{trimmed} 12:00:00")
    } else if BASEDATE_COMPACT.is_match(trimmed) {
        format!(
            "{}:{}:{} 12:00:00",
            &trimmed[..4],
            &trimmed[4..6],
            &trimmed[6..8]
        )
    } else {
        warn!(basedate = text, "Unrecognized base date, ignoring it");
        return None;
    };

    match NaiveDateTime::parse_from_str(&full, EXIF_TIME_FORMAT) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!(basedate = text, error = %e, "Base date does not parse, ignoring it");
            None
        }
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Assign capture times starting from this base date
    pub basedate: Option<String>,
    /// Shift existing capture times by this signed adjustment
    pub delta: Option<String>,
    /// Overwrite tags even when they are present or out of sync
    pub force: bool,
    /// Preserve each file under a `_original` sibling before writing
    pub keep_original: bool,
    /// Report what would change without touching anything
    pub simulate: bool,
    /// Camera make to fill in
    pub make: Option<String>,
    /// Camera model to fill in
    pub model: Option<String>,
}

/// Reconcile the metadata of every file listed on the input stream.
///
/// A malformed delta is fatal before any file is touched. Per-file
/// problems are reported and skipped; a failed original preservation or
/// a broken input stream stops the run.
pub fn run<R: BufRead>(input: R, options: &ReconcileOptions) -> Result<()> {
    let delta = match &options.delta {
        Some(text) => Some(normalize_delta(text)?),
        None => None,
    };
    if let Some(delta) = &delta {
        info!(delta = %delta.canonical(), "Adjusting capture times");
    }
    let basedate = options.basedate.as_deref().and_then(normalize_basedate);

    for (index, path) in pathlist::paths(input).enumerate() {
        let path = path?;
        if let Err(e) = reconcile_file(&path, index as i64, basedate, delta, options) {
            match e {
                Error::Backup { .. } | Error::Io(_) => return Err(e),
                e => warn!(?path, error = %e, "Skipping file"),
            }
        }
    }
    Ok(())
}

fn reconcile_file(
    path: &Path,
    index: i64,
    basedate: Option<NaiveDateTime>,
    delta: Option<Delta>,
    options: &ReconcileOptions,
) -> Result<()> {
    if options.keep_original {
        backup_original(path, options.simulate)?;
    }

    let tags = meta::read_tag_set(path)?;
    let mut patch = TagPatch::default();
    let mut fs_time = None;

    if let Some(delta) = delta {
        if let Some(anchor_text) = &tags.original {
            let anchor = meta::parse_time(anchor_text)?;
            let shifted_text =
                meta::format_time(anchor + chrono::Duration::seconds(delta.seconds()));
            let in_sync = |tag: &Option<String>| tag.as_deref() == Some(anchor_text.as_str());

            if options.force || in_sync(&tags.digitized) {
                patch.digitized = Some(shifted_text.clone());
            } else if tags.digitized.is_some() {
                warn!(?path, "Digitized time out of sync with capture time, skipped");
            }
            if options.force || in_sync(&tags.modified) {
                patch.modified = Some(shifted_text.clone());
            } else if tags.modified.is_some() {
                warn!(?path, "Modification time out of sync with capture time, skipped");
            }
            patch.original = Some(shifted_text);
        } else {
            // Only the shift is skipped; the camera fields below still apply.
            warn!(?path, "No capture time to adjust");
        }
    } else if let Some(base) = basedate {
        if options.force || tags.no_time_tags() {
            // Spread assigned times two seconds apart so list order
            // survives later sorting by capture time.
            let assigned = base + chrono::Duration::seconds(2 * index);
            let text = meta::format_time(assigned);
            patch.original = Some(text.clone());
            patch.digitized = Some(text.clone());
            patch.modified = Some(text);
            fs_time = Some(assigned);
        } else {
            debug!(?path, "Capture time already present, leaving it");
        }
    }

    if let Some(make) = &options.make
        && !make.is_empty()
        && (options.force || tags.make.is_none())
    {
        patch.make = Some(make.clone());
    }
    if let Some(model) = &options.model
        && !model.is_empty()
        && (options.force || tags.model.is_none())
    {
        patch.model = Some(model.clone());
    }

    if patch.is_empty() {
        debug!(?path, "Nothing to reconcile");
        return Ok(());
    }
    if options.simulate {
        info!(?path, ?patch, "Would save metadata");
        return Ok(());
    }

    patch.save(path)?;

    if let Some(time) = fs_time
        && let Err(e) = meta::sync_file_times(path, time)
    {
        warn!(?path, error = %e, "Failed to set file times");
    }
    Ok(())
}

/// Preserve the file under a `_original` sibling. The original inode
/// moves to the backup name and a fresh copy takes its place, so later
/// tag writes cannot reach the preserved bytes. An existing backup is
/// left alone.
fn backup_original(path: &Path, simulate: bool) -> Result<()> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    let backup = PathBuf::from(backup);

    if backup.exists() {
        debug!(?path, "Original already preserved");
        return Ok(());
    }
    if simulate {
        info!(?path, ?backup, "Would preserve original");
        return Ok(());
    }

    fs::rename(path, &backup).map_err(|e| Error::Backup {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    fs::copy(&backup, path).map_err(|e| Error::Backup {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(?path, ?backup, "Preserved original");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_delta_hour_shapes() {
        assert_eq!(normalize_delta("3").unwrap().seconds(), 3 * 3600);
        assert_eq!(normalize_delta("03").unwrap().seconds(), 3 * 3600);
    }

    #[test]
    fn test_delta_compact_shapes() {
        assert_eq!(normalize_delta("0330").unwrap().seconds(), 3 * 3600 + 30 * 60);
        assert_eq!(
            normalize_delta("033015").unwrap().seconds(),
            3 * 3600 + 30 * 60 + 15
        );
    }

    #[test]
    fn test_delta_clock_shapes() {
        assert_eq!(normalize_delta("03:30").unwrap().seconds(), 3 * 3600 + 30 * 60);
        assert_eq!(
            normalize_delta("03:30:15").unwrap().seconds(),
            3 * 3600 + 30 * 60 + 15
        );
        assert_eq!(normalize_delta("12:00:05").unwrap().seconds(), 12 * 3600 + 5);
    }

    #[test]
    fn test_delta_signs() {
        assert_eq!(normalize_delta("+1").unwrap().seconds(), 3600);
        assert_eq!(normalize_delta("-1").unwrap().seconds(), -3600);
        assert_eq!(
            normalize_delta("-0330").unwrap().seconds(),
            -(3 * 3600 + 30 * 60)
        );
        assert_eq!(normalize_delta("-03:30").unwrap().seconds(), -(3 * 3600 + 30 * 60));
    }

    #[test]
    fn test_delta_rejects_bad_shapes() {
        let bad_shapes = [
            "123", "12345", "1234567", "3:30", "3:30:15", "1:2:3", "1:23:4", "abc", "", "+", "-",
        ];
        for bad in bad_shapes {
            assert!(normalize_delta(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_delta_canonical() {
        assert_eq!(normalize_delta("-0330").unwrap().canonical(), "-03:30:00");
        assert_eq!(normalize_delta("9").unwrap().canonical(), "+09:00:00");
        assert_eq!(normalize_delta("033015").unwrap().canonical(), "+03:30:15");
    }

    #[test]
    fn test_basedate_formats() {
        let noon = normalize_basedate("2021:06:01").unwrap();
        assert_eq!(meta::format_time(noon), "2021:06:01 12:00:00");

        let compact = normalize_basedate("20210601").unwrap();
        assert_eq!(compact, noon);

        let full = normalize_basedate("2021:06:01 08:00:00").unwrap();
        assert_eq!(meta::format_time(full), "2021:06:01 08:00:00");
    }

    #[test]
    fn test_basedate_rejects_unusable_input() {
        assert!(normalize_basedate("2021-06-01").is_none());
        assert!(normalize_basedate("garbage").is_none());
        assert!(normalize_basedate("202106").is_none());
        // Shape fits but the calendar disagrees
        assert!(normalize_basedate("2021:13:45 25:61:61").is_none());
    }

    #[test]
    fn test_simulate_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        image::RgbImage::from_pixel(16, 16, image::Rgb([5, 5, 5]))
            .save(&path)
            .unwrap();
        let before = std::fs::read(&path).unwrap();

        let options = ReconcileOptions {
            basedate: Some("2021:06:01".to_string()),
            keep_original: true,
            simulate: true,
            make: Some("ACME".to_string()),
            ..ReconcileOptions::default()
        };
        let listing = format!("{}\n", path.display());
        run(Cursor::new(listing), &options).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), before);
        let mut backup = path.as_os_str().to_owned();
        backup.push(BACKUP_SUFFIX);
        assert!(!PathBuf::from(backup).exists());
    }

    #[test]
    fn test_malformed_delta_is_fatal() {
        let options = ReconcileOptions {
            delta: Some("12345".to_string()),
            ..ReconcileOptions::default()
        };
        assert!(run(Cursor::new(""), &options).is_err());
    }
}
