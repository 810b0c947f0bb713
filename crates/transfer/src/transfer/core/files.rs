//! File operation utilities
//!
//! Partial-file naming and atomic promotion live here so every caller agrees
//! on the on-disk contract: the final destination is only ever produced by a
//! rename of a verified partial file.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::transfer::core::error::{FileOperation, Result, TransferError};

/// Suffix appended to a destination path while a transfer is incomplete.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Staging path for an in-progress transfer
///
/// The partial file's size is the sole resume cursor; no separate offset
/// metadata is persisted.
pub fn partial_path(dest_path: &Path) -> PathBuf {
    let mut name = dest_path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Size of an existing partial file, or 0 when none exists.
pub async fn resume_offset(partial: &Path) -> Result<u64> {
    match fs::metadata(partial).await {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(TransferError::FileSystem {
            path: partial.to_path_buf(),
            operation: FileOperation::Metadata,
            source: e,
        }),
    }
}

/// Atomically promote a verified partial file to its final destination.
pub async fn promote(partial: &Path, dest_path: &Path) -> Result<()> {
    fs::rename(partial, dest_path)
        .await
        .map_err(|e| TransferError::FileSystem {
            path: partial.to_path_buf(),
            operation: FileOperation::Rename,
            source: e,
        })?;
    debug!("Promoted {} to {}", partial.display(), dest_path.display());
    Ok(())
}
