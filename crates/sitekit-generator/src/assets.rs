//! Static asset copying.
//!
//! Files under the public directory (stylesheet, favicon, images) are copied
//! to the output root unchanged.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

use crate::collector::{CollectorError, FileWalker};

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source directory could not be traversed.
    #[error(transparent)]
    Walk(#[from] CollectorError),

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Copy every non-hidden file under `source_dir` into `dest_dir`, keeping
/// relative paths. Returns the number of files copied.
///
/// A missing source directory copies nothing.
pub fn copy_public(source_dir: &Path, dest_dir: &Path) -> Result<usize> {
    if !source_dir.is_dir() {
        debug!(dir = %source_dir.display(), "public directory does not exist, skipping");
        return Ok(0);
    }

    info!(
        source = %source_dir.display(),
        dest = %dest_dir.display(),
        "copying assets"
    );

    let mut count = 0;
    for entry in FileWalker::new(source_dir).walk()? {
        let path = entry?;
        let relative = path
            .strip_prefix(source_dir)
            .map_err(|_| AssetError::InvalidPath(path.clone()))?;
        let dest = dest_dir.join(relative);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&path, &dest)?;
        debug!(from = %path.display(), to = %dest.display(), "asset copied");
        count += 1;
    }

    info!(count, "assets copied");
    Ok(count)
}
