//! Deterministic reorganization stage
//!
//! Hard-links each listed file into a destination tree derived from its
//! capture time, camera model and size, so repeated runs over the same
//! collection produce the same layout. An occupied destination that is
//! not the file itself stops the run: two different files mapping to one
//! destination means the collection still holds duplicates.

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use tracing::{debug, info, warn};

use crate::config::{Granularity, ModelPlacement};
use crate::error::{Error, Result};
use crate::hash;
use crate::meta;
use crate::pathlist;

/// Folder and fragment stand-in for files without a camera model tag.
const MODEL_FALLBACK: &str = "unknown";

/// Suffix for organized filenames.
const IMAGE_SUFFIX: &str = ".jpg";

/// Options for an organize run
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Root of the destination tree
    pub base: PathBuf,
    /// Where the camera-model folder sits
    pub placement: ModelPlacement,
    /// Date folder granularity
    pub granularity: Granularity,
    /// Filename template
    pub template: String,
    /// Remove each source file after linking it
    pub remove_original: bool,
}

/// Link every file listed on the input stream into the destination tree.
///
/// The template is validated before any file is touched. Per-file
/// problems are reported and skipped; a destination collision or a
/// broken input stream stops the run.
pub fn run<R: BufRead>(input: R, options: &OrganizeOptions) -> Result<()> {
    validate_template(&options.template)?;

    for path in pathlist::paths(input) {
        let path = path?;
        if let Err(e) = organize_file(&path, options) {
            match e {
                Error::Collision { .. } => return Err(e),
                e => warn!(?path, error = %e, "Skipping file"),
            }
        }
    }
    Ok(())
}

fn organize_file(path: &Path, options: &OrganizeOptions) -> Result<()> {
    let tags = match meta::read_tag_set(path) {
        Ok(tags) => tags,
        Err(e) => {
            debug!(?path, error = %e, "No readable metadata");
            Default::default()
        }
    };

    let time = match tags
        .original
        .as_deref()
        .and_then(|text| meta::parse_time(text).ok())
    {
        Some(time) => time,
        None => meta::modified_time(path)?,
    };
    let model = tags.model.unwrap_or_else(|| MODEL_FALLBACK.to_string());
    let size = fs::metadata(path)
        .map_err(|e| Error::Filesystem {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .len();

    let dir = destination_dir(&options.base, time, &model, options.placement, options.granularity);
    fs::create_dir_all(&dir).map_err(|e| Error::Filesystem {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    let dest = dir.join(filename(&options.template, time, &model, size));

    if dest.symlink_metadata().is_ok() {
        if same_file(path, &dest) {
            warn!(?path, ?dest, "Destination is this file, skipping");
            return Ok(());
        }
        return Err(Error::Collision { path: dest });
    }

    fs::hard_link(path, &dest).map_err(|e| Error::Filesystem {
        path: dest.clone(),
        message: e.to_string(),
    })?;
    info!(source = ?path, destination = ?dest, "Linked");

    if options.remove_original {
        match fs::remove_file(path) {
            Ok(()) => debug!(?path, "Removed original"),
            Err(e) => warn!(?path, error = %e, "Failed to remove original"),
        }
    }
    Ok(())
}

/// Check a filename template for unusable strftime specifiers.
pub fn validate_template(template: &str) -> Result<()> {
    if StrftimeItems::new(template).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Validation(format!(
            "invalid filename template '{}'",
            template
        )));
    }
    Ok(())
}

/// Build the destination directory from the date folders and the
/// optional camera-model folder.
fn destination_dir(
    base: &Path,
    time: NaiveDateTime,
    model: &str,
    placement: ModelPlacement,
    granularity: Granularity,
) -> PathBuf {
    let mut dir = base.to_path_buf();
    if placement == ModelPlacement::Before {
        dir.push(model_folder(model));
    }
    for segment in time_segments(time, granularity) {
        dir.push(segment);
    }
    if placement == ModelPlacement::After {
        dir.push(model_folder(model));
    }
    dir
}

/// Date folder segments for the configured granularity.
fn time_segments(time: NaiveDateTime, granularity: Granularity) -> Vec<String> {
    let fmt = |spec: &str| time.format(spec).to_string();
    match granularity {
        Granularity::All => vec![],
        Granularity::Year => vec![fmt("%Y")],
        Granularity::Month => vec![fmt("%Y"), fmt("%m")],
        Granularity::Week => vec![fmt("%Y"), fmt("%W")],
        Granularity::DayOfWeek => vec![fmt("%Y"), fmt("%W"), fmt("%a")],
        Granularity::Day => vec![fmt("%Y"), fmt("%m"), fmt("%d")],
    }
}

/// Expand the template into a destination filename.
///
/// `{model}` and `{size}` become short hex fragments before the
/// remaining strftime specifiers are applied, so the substituted values
/// cannot smuggle new specifiers in.
fn filename(template: &str, time: NaiveDateTime, model: &str, size: u64) -> String {
    let expanded = template
        .replace("{model}", &hash::short_fragment(model.as_bytes()))
        .replace("{size}", &hash::short_fragment(size.to_string().as_bytes()));
    format!("{}{}", time.format(&expanded), IMAGE_SUFFIX)
}

/// Camera model as a folder name: path separators flattened, empty
/// models replaced by the fallback.
fn model_folder(model: &str) -> String {
    let cleaned = model.trim().replace(['/', '\\'], "_");
    if cleaned.is_empty() {
        MODEL_FALLBACK.to_string()
    } else {
        cleaned
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
