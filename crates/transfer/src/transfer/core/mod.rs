//! Core types used throughout the transfer system
//!
//! This module contains the fundamental types that all other modules depend
//! on: manifest entries, transfer outcomes, progress plumbing, and errors.

pub mod checksum;
pub mod error;
pub mod files;
pub mod progress;

// Re-export main types for convenience
pub use error::{FileOperation, Result, TransferError};
pub use progress::{
    ConsoleProgressReporter, IntoProgressCallback, NullProgressReporter, ProgressCallback,
    ProgressEvent, ProgressReporter,
};

use serde::Deserialize;

/// One logical file from the manifest
///
/// Several candidate URLs may host the same bytes over different protocols;
/// the expected MD5 is the integrity contract for all of them. Immutable
/// once handed to the core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    /// Manifest file ID
    pub id: String,
    /// Ordered candidate URLs, each with a scheme prefix
    #[serde(deserialize_with = "deserialize_urls")]
    pub urls: Vec<String>,
    /// Expected MD5 digest as a hex string
    pub md5: String,
}

impl FileEntry {
    pub fn new<S: Into<String>>(id: S, urls: Vec<String>, md5: S) -> Self {
        Self {
            id: id.into(),
            urls,
            md5: md5.into(),
        }
    }

    /// Build an entry from the manifest's comma-joined URL form.
    pub fn from_joined_urls(id: &str, joined_urls: &str, md5: &str) -> Self {
        let urls = joined_urls
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            id: id.to_string(),
            urls,
            md5: md5.to_string(),
        }
    }
}

/// Manifests serialize URLs as one comma-joined string.
fn deserialize_urls<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let joined = String::deserialize(deserializer)?;
    Ok(joined
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect())
}

/// Result of one file transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// File was streamed, verified and promoted to its destination
    Completed { size: u64 },
    /// Destination already existed; nothing was downloaded
    AlreadyComplete { size: u64 },
    /// All bytes arrived but the MD5 did not match; the partial file is
    /// retained as the resume/re-verify point
    ChecksumFailed { partial: std::path::PathBuf },
}

/// Destination file name for a chosen URL: its last path segment.
pub fn file_name_for_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).map_err(|e| TransferError::InvalidUrl {
        url: url.to_string(),
        source: e,
    })?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TransferError::InvalidUrl {
            url: url.to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        })
}
