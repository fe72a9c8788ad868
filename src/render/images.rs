//! Content-addressed filenames for cached avatar images.
//!
//! The image cache is flat and has no index: a downloader and the renderer
//! both derive the local name from the remote URL alone.

use sha2::{Digest, Sha256};

/// Number of hex digits of the digest kept in the filename.
pub const HASH_PREFIX_LEN: usize = 20;

/// Extension appended to every cached image, regardless of its real format.
pub const IMAGE_EXTENSION: &str = ".png";

/// Map an image URL to its local filename.
#[must_use]
pub fn local_name(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}{IMAGE_EXTENSION}", &digest[..HASH_PREFIX_LEN])
}

/// Relative path used in `<img src>` for an image cached under `subdir`.
#[must_use]
pub fn image_src(subdir: &str, url: &str) -> String {
    let subdir = subdir.trim_end_matches('/');
    if subdir.is_empty() {
        local_name(url)
    } else {
        format!("{subdir}/{}", local_name(url))
    }
}
