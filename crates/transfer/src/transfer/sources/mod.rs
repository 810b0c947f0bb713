//! Transfer source implementations
//!
//! Two structurally different transfer models hide behind one trait: a
//! generic HTTP byte stream opened once at the resume offset, and an object
//! store answering an explicit byte-range request per call. The download
//! loop stays protocol-agnostic.

pub mod object;
pub mod stream;

pub use object::ObjectSource;
pub use stream::StreamSource;

use async_trait::async_trait;
use bytes::Bytes;

use crate::transfer::config::TransferConfig;
use crate::transfer::core::error::{Result, TransferError};

/// Capability set shared by all source variants
#[async_trait]
pub trait TransferSource: Send {
    /// Total size of the remote file in bytes, as reported at open time
    fn total_size(&self) -> u64;

    /// Fetch the next block of bytes for `[start, end]` (inclusive)
    ///
    /// Returns `Ok(None)` once the source is exhausted. Stream-backed
    /// sources serve sequential reads and only honor the range at open
    /// time; object-backed sources issue one explicit range request per
    /// call.
    async fn fetch_range(&mut self, start: u64, end: u64) -> Result<Option<Bytes>>;

    /// URL this source was opened from, for logging and reports
    fn url(&self) -> &str;
}

/// Open the right source variant for a URL, seeking to `resume_offset`
///
/// An unreachable endpoint (network failure, 4xx/5xx, missing key) surfaces
/// here as an error; callers treat it as fatal for the entry, not the run.
pub async fn open_source(
    url: &str,
    resume_offset: u64,
    config: &TransferConfig,
) -> Result<Box<dyn TransferSource>> {
    let lowered = url.to_ascii_lowercase();
    if lowered.starts_with("s3://") {
        Ok(Box::new(ObjectSource::open(url, config).await?))
    } else if lowered.starts_with("http://") || lowered.starts_with("https://") {
        Ok(Box::new(StreamSource::open(url, resume_offset, config).await?))
    } else {
        Err(TransferError::UnsupportedProtocol {
            url: url.to_string(),
        })
    }
}
