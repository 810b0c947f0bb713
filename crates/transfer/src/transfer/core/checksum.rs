//! Streaming MD5 verification
//!
//! The manifest carries an MD5 per file; a transfer is only promoted to its
//! final destination after the partial file hashes to that value. Files are
//! read in fixed-size chunks so verification never loads a whole file into
//! memory.

use md5::{Digest, Md5};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::transfer::core::error::{FileOperation, Result, TransferError};

/// Read granularity for hashing; independent of the transfer block size.
const HASH_BUFFER_SIZE: usize = 4096;

/// Compute the lowercase hex MD5 digest of a file by streaming its bytes.
pub async fn digest<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut file = fs::File::open(path)
        .await
        .map_err(|e| TransferError::FileSystem {
            path: path.to_path_buf(),
            operation: FileOperation::Read,
            source: e,
        })?;

    let mut hasher = Md5::new();
    let mut buffer = [0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .await
            .map_err(|e| TransferError::FileSystem {
                path: path.to_path_buf(),
                operation: FileOperation::Read,
                source: e,
            })?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check a file against an expected MD5 hex string.
///
/// The comparison is case-insensitive on the expected side since manifests
/// are not consistent about hex casing. Pure function of the file bytes.
pub async fn verify<P: AsRef<Path>>(path: P, expected_hex: &str) -> Result<bool> {
    let path = path.as_ref();
    let actual = digest(path).await?;
    let matches = actual == expected_hex.to_ascii_lowercase();
    debug!(
        "MD5 for {}: expected={}, actual={}, matches={}",
        path.display(),
        expected_hex,
        actual,
        matches
    );
    Ok(matches)
}
