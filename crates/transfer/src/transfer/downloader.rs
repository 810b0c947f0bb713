//! Chunked copy loop with resume support
//!
//! Drives any `TransferSource` into a partial file, block by block, then
//! gates promotion on the MD5 check. The partial file's size on disk is the
//! only resume state; nothing else is persisted between runs.

use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::transfer::config::TransferConfig;
use crate::transfer::core::error::{FileOperation, Result, TransferError};
use crate::transfer::core::progress::{ProgressCallback, ProgressEvent};
use crate::transfer::core::{checksum, files, TransferOutcome};
use crate::transfer::sources::{open_source, TransferSource};

pub struct RangeDownloader {
    config: TransferConfig,
}

impl RangeDownloader {
    pub fn new(config: TransferConfig) -> Self {
        Self { config }
    }

    /// Resume offset for a destination: the current size of its partial file
    pub async fn resume_offset(&self, dest_path: &Path) -> Result<u64> {
        files::resume_offset(&files::partial_path(dest_path)).await
    }

    /// Transfer `url` to `dest_path`, resuming any existing partial file
    ///
    /// Opens the source at the resume offset and hands off to
    /// [`RangeDownloader::download`]. Split out so the driver can open
    /// sources itself when walking a fallback chain.
    pub async fn transfer(
        &self,
        url: &str,
        dest_path: &Path,
        expected_md5: &str,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<TransferOutcome> {
        if let Some(outcome) = self.check_existing(dest_path).await? {
            return Ok(outcome);
        }
        let resume_offset = self.resume_offset(dest_path).await?;
        let source = open_source(url, resume_offset, &self.config).await?;
        self.download(source, dest_path, expected_md5, progress_callback)
            .await
    }

    /// Pre-existing destinations are trusted without re-verification. That
    /// mirrors the original client; a corrupted final file is invisible to
    /// this path, hence the warning rather than a silent skip.
    pub async fn check_existing(&self, dest_path: &Path) -> Result<Option<TransferOutcome>> {
        match fs::metadata(dest_path).await {
            Ok(meta) => {
                warn!(
                    "Destination {} already exists ({} bytes), skipping without re-verification",
                    dest_path.display(),
                    meta.len()
                );
                Ok(Some(TransferOutcome::AlreadyComplete { size: meta.len() }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TransferError::FileSystem {
                path: dest_path.to_path_buf(),
                operation: FileOperation::Metadata,
                source: e,
            }),
        }
    }

    /// Run the chunked copy loop against an already-open source
    ///
    /// The source must have been opened at this destination's resume offset.
    pub async fn download(
        &self,
        mut source: Box<dyn TransferSource>,
        dest_path: &Path,
        expected_md5: &str,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<TransferOutcome> {
        let partial = files::partial_path(dest_path);
        let mut bytes_written = files::resume_offset(&partial).await?;
        let total_size = source.total_size();

        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::TransferStarted {
                url: source.url().to_string(),
                total_size,
                resumed_from: bytes_written,
            });
        }
        debug!(
            "Downloading {} to {} ({} bytes, starting at {})",
            source.url(),
            dest_path.display(),
            total_size,
            bytes_written
        );

        // Append mode, never truncate: earlier bytes are the resume state.
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&partial)
            .await
            .map_err(|e| TransferError::FileSystem {
                path: partial.clone(),
                operation: FileOperation::Create,
                source: e,
            })?;

        let block = self.config.block_size_u64();
        loop {
            let chunk = match source
                .fetch_range(bytes_written, bytes_written + block - 1)
                .await?
            {
                Some(chunk) if !chunk.is_empty() => chunk,
                _ => break,
            };

            file.write_all(&chunk)
                .await
                .map_err(|e| TransferError::FileSystem {
                    path: partial.clone(),
                    operation: FileOperation::Write,
                    source: e,
                })?;
            bytes_written += chunk.len() as u64;

            if let Some(ref callback) = progress_callback {
                // A zero or unknown total must not divide the percentage.
                let percent = if total_size > 0 {
                    bytes_written as f64 * 100.0 / total_size as f64
                } else {
                    0.0
                };
                callback(ProgressEvent::ChunkTransferred {
                    url: source.url().to_string(),
                    bytes_written,
                    total_size,
                    percent,
                });
            }
        }

        file.flush()
            .await
            .map_err(|e| TransferError::FileSystem {
                path: partial.clone(),
                operation: FileOperation::Write,
                source: e,
            })?;
        drop(file);

        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::ChecksumStarted {
                file: partial.display().to_string(),
            });
        }

        let valid = checksum::verify(&partial, expected_md5).await?;
        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::ChecksumComplete {
                file: partial.display().to_string(),
                valid,
            });
        }

        if !valid {
            // The partial file stays put so a later run can re-verify or
            // resume without starting over.
            warn!(
                "MD5 mismatch for {}, leaving partial file {}",
                source.url(),
                partial.display()
            );
            return Ok(TransferOutcome::ChecksumFailed { partial });
        }

        files::promote(&partial, dest_path).await?;
        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::TransferComplete {
                url: source.url().to_string(),
                final_size: bytes_written,
            });
        }

        Ok(TransferOutcome::Completed {
            size: bytes_written,
        })
    }
}
