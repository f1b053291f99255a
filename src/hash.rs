//! Content identity hashing
//!
//! Identity is computed over decoded pixel data rather than file bytes,
//! so re-encoded metadata (EXIF edits, stripped thumbnails) never changes
//! a photo's identity. Files the decoder rejects get a sentinel identity
//! that groups them together without colliding with any real digest.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{Error, Result};

/// Identity assigned to files whose pixel content cannot be decoded.
/// Same width as a hex digest but outside the hex alphabet.
pub const SENTINEL_IDENTITY: &str =
    "----------------------------------------------------------------";

/// Length of the short fragments used in generated filenames.
pub const FRAGMENT_LEN: usize = 4;

/// Compute the content identity of an image: a SHA-256 digest over the
/// decoded RGB pixel bytes.
pub fn pixel_digest(path: &Path) -> Result<String> {
    let image = image::open(path).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let pixels = image.to_rgb8();

    let mut hasher = Sha256::default();
    hasher.update(pixels.as_raw());
    let digest = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>();

    trace!(?path, digest, "Computed pixel digest");
    Ok(digest)
}

/// Short hex fragment of arbitrary data, for filename components.
pub fn short_fragment(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))[..FRAGMENT_LEN].to_string()
}
