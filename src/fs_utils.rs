use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

static NON_WORD_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Build an output filename from a story title.
///
/// Every run of non-word characters collapses to a single underscore.
#[must_use]
pub fn derived_file_name(title: &str, extension: &str) -> String {
    format!("{}.{extension}", NON_WORD_RUN.replace_all(title, "_"))
}

/// Write `contents` to `path` via a temporary file in the same directory.
///
/// A reader never observes a half-written file at `path`; on failure the
/// temporary file is removed and any previous file is left in place.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let temp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?
        .into_temp_path();

    tokio::fs::write(&temp, contents)
        .await
        .with_context(|| format!("Failed to write temporary file: {}", temp.display()))?;

    debug!(temp = %temp.display(), path = %path.display(), "Renaming temporary file into place");
    temp.persist(path)
        .with_context(|| format!("Failed to move output into place: {}", path.display()))?;

    Ok(())
}
