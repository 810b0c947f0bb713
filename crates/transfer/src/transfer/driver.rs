//! Manifest-level orchestration
//!
//! The driver walks manifest entries one at a time: resolve an endpoint,
//! run the chunked downloader, record the outcome. A failing entry is a
//! report line, never the end of the run.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::transfer::config::TransferConfig;
use crate::transfer::core::error::TransferError;
use crate::transfer::core::progress::{ProgressCallback, ProgressEvent};
use crate::transfer::core::{file_name_for_url, FileEntry, TransferOutcome};
use crate::transfer::downloader::RangeDownloader;
use crate::transfer::endpoint::EndpointSelector;
use crate::transfer::sources::open_source;

/// Per-entry result recorded in the run report
#[derive(Debug)]
pub enum EntryOutcome {
    Completed { size: u64 },
    AlreadyComplete { size: u64 },
    ChecksumFailed { partial: PathBuf },
    /// No candidate URL matched any priority tag; not an error
    NoEndpoint,
    Failed { error: TransferError },
}

#[derive(Debug)]
pub struct EntryReport {
    pub id: String,
    pub url: Option<String>,
    pub outcome: EntryOutcome,
}

/// Aggregate report for one driver run
#[derive(Debug, Default)]
pub struct TransferReport {
    pub entries: Vec<EntryReport>,
}

impl TransferReport {
    pub fn completed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.outcome,
                    EntryOutcome::Completed { .. } | EntryOutcome::AlreadyComplete { .. }
                )
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.outcome,
                    EntryOutcome::ChecksumFailed { .. } | EntryOutcome::Failed { .. }
                )
            })
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::NoEndpoint))
            .count()
    }
}

pub struct TransferDriver {
    selector: EndpointSelector,
    downloader: RangeDownloader,
    config: TransferConfig,
}

impl TransferDriver {
    pub fn new(selector: EndpointSelector, config: TransferConfig) -> Self {
        let downloader = RangeDownloader::new(config.clone());
        Self {
            selector,
            downloader,
            config,
        }
    }

    /// Transfer every entry into `destination`, sequentially
    ///
    /// Destination files land at `{destination}/{basename-of-chosen-URL}`.
    /// Never aborts the run for one entry's failure.
    pub async fn run(
        &self,
        entries: &[FileEntry],
        destination: &Path,
        progress_callback: Option<ProgressCallback>,
    ) -> TransferReport {
        let mut report = TransferReport::default();

        for entry in entries {
            let entry_report = self
                .process_entry(entry, destination, progress_callback.clone())
                .await;
            report.entries.push(entry_report);
        }

        info!(
            "Transfer run finished: {} completed, {} failed, {} skipped",
            report.completed(),
            report.failed(),
            report.skipped()
        );
        report
    }

    async fn process_entry(
        &self,
        entry: &FileEntry,
        destination: &Path,
        progress_callback: Option<ProgressCallback>,
    ) -> EntryReport {
        let candidates = self.selector.select_ordered(&entry.urls);
        if candidates.is_empty() {
            // Private data, or a record with no usable endpoint. Skip.
            warn!("No valid URL found for file ID: {}", entry.id);
            if let Some(ref callback) = progress_callback {
                callback(ProgressEvent::EntrySkipped {
                    id: entry.id.clone(),
                    reason: "no candidate URL matches the endpoint priorities".to_string(),
                });
            }
            return EntryReport {
                id: entry.id.clone(),
                url: None,
                outcome: EntryOutcome::NoEndpoint,
            };
        }

        match self
            .transfer_with_fallback(entry, &candidates, destination, progress_callback.clone())
            .await
        {
            Ok((url, outcome)) => EntryReport {
                id: entry.id.clone(),
                url: Some(url),
                outcome: match outcome {
                    TransferOutcome::Completed { size } => EntryOutcome::Completed { size },
                    TransferOutcome::AlreadyComplete { size } => {
                        EntryOutcome::AlreadyComplete { size }
                    }
                    TransferOutcome::ChecksumFailed { partial } => {
                        EntryOutcome::ChecksumFailed { partial }
                    }
                },
            },
            Err((url, error)) => {
                warn!("Entry {} failed: {}", entry.id, error);
                if let Some(ref callback) = progress_callback {
                    callback(ProgressEvent::Error {
                        url: url.clone().unwrap_or_default(),
                        error: error.to_string(),
                    });
                }
                EntryReport {
                    id: entry.id.clone(),
                    url,
                    outcome: EntryOutcome::Failed { error },
                }
            }
        }
    }

    /// Try each candidate in priority order until one can be opened
    ///
    /// Only open/size failures move on to the next endpoint; once a source
    /// is streaming, its errors belong to this entry. Failures are paired
    /// with the URL they happened on for the report.
    async fn transfer_with_fallback(
        &self,
        entry: &FileEntry,
        candidates: &[String],
        destination: &Path,
        progress_callback: Option<ProgressCallback>,
    ) -> std::result::Result<(String, TransferOutcome), (Option<String>, TransferError)> {
        let mut last_failure = None;

        for url in candidates {
            let file_name = match file_name_for_url(url) {
                Ok(name) => name,
                Err(e) => {
                    last_failure = Some((Some(url.clone()), e));
                    continue;
                }
            };
            let dest_path = destination.join(file_name);

            match self.downloader.check_existing(&dest_path).await {
                Ok(Some(outcome)) => return Ok((url.clone(), outcome)),
                Ok(None) => {}
                Err(e) => return Err((Some(url.clone()), e)),
            }

            let resume_offset = match self.downloader.resume_offset(&dest_path).await {
                Ok(offset) => offset,
                Err(e) => return Err((Some(url.clone()), e)),
            };

            match open_source(url, resume_offset, &self.config).await {
                Ok(source) => {
                    debug!("Selected endpoint {} for file ID {}", url, entry.id);
                    return self
                        .downloader
                        .download(source, &dest_path, &entry.md5, progress_callback)
                        .await
                        .map(|outcome| (url.clone(), outcome))
                        .map_err(|e| (Some(url.clone()), e));
                }
                Err(e) => {
                    // Unreachable endpoint: fall back to the next candidate.
                    warn!("Cannot open {} for file ID {}: {}", url, entry.id, e);
                    last_failure = Some((Some(url.clone()), e));
                }
            }
        }

        Err(last_failure.unwrap_or((
            None,
            TransferError::NoEndpoint {
                id: entry.id.clone(),
            },
        )))
    }
}
