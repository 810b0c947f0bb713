//! Progress tracking and reporting for transfer operations

use std::sync::Arc;

/// Progress callback for transfer operations
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted during transfer operations
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    TransferStarted {
        url: String,
        total_size: u64,
        resumed_from: u64,
    },
    /// One event per block written to the partial file
    ChunkTransferred {
        url: String,
        bytes_written: u64,
        total_size: u64,
        percent: f64,
    },
    TransferComplete {
        url: String,
        final_size: u64,
    },
    ChecksumStarted {
        file: String,
    },
    ChecksumComplete {
        file: String,
        valid: bool,
    },
    EntrySkipped {
        id: String,
        reason: String,
    },
    Error {
        url: String,
        error: String,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_transfer_started(&self, _url: &str, _total_size: u64, _resumed_from: u64) {}
    fn on_chunk_transferred(&self, _url: &str, _bytes_written: u64, _total_size: u64, _percent: f64) {}
    fn on_transfer_complete(&self, _url: &str, _final_size: u64) {}
    fn on_checksum_started(&self, _file: &str) {}
    fn on_checksum_complete(&self, _file: &str, _valid: bool) {}
    fn on_entry_skipped(&self, _id: &str, _reason: &str) {}
    fn on_error(&self, _url: &str, _error: &str) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::TransferStarted { url, total_size, resumed_from } => {
                self.on_transfer_started(&url, total_size, resumed_from);
            }
            ProgressEvent::ChunkTransferred { url, bytes_written, total_size, percent } => {
                self.on_chunk_transferred(&url, bytes_written, total_size, percent);
            }
            ProgressEvent::TransferComplete { url, final_size } => {
                self.on_transfer_complete(&url, final_size);
            }
            ProgressEvent::ChecksumStarted { file } => {
                self.on_checksum_started(&file);
            }
            ProgressEvent::ChecksumComplete { file, valid } => {
                self.on_checksum_complete(&file, valid);
            }
            ProgressEvent::EntrySkipped { id, reason } => {
                self.on_entry_skipped(&id, &reason);
            }
            ProgressEvent::Error { url, error } => {
                self.on_error(&url, &error);
            }
        })
    }
}

/// Console progress reporter matching the original client's textual output
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_transfer_started(&self, url: &str, total_size: u64, resumed_from: u64) {
        if resumed_from > 0 {
            println!("Downloading {} ({} bytes, resuming at {})", url, total_size, resumed_from);
        } else {
            println!("Downloading {} ({} bytes)", url, total_size);
        }
    }

    fn on_chunk_transferred(&self, _url: &str, bytes_written: u64, _total_size: u64, percent: f64) {
        print!("\r{}  [{:.2}%]", bytes_written, percent);
    }

    fn on_transfer_complete(&self, url: &str, final_size: u64) {
        println!("\nTransfer complete: {} ({} bytes)", url, final_size);
    }

    fn on_checksum_started(&self, file: &str) {
        if self.verbose {
            println!("Verifying MD5: {}", file);
        }
    }

    fn on_checksum_complete(&self, file: &str, valid: bool) {
        if !valid {
            println!("\rMD5 check failed for the file: {}", file);
        } else if self.verbose {
            println!("MD5 verified: {}", file);
        }
    }

    fn on_entry_skipped(&self, id: &str, reason: &str) {
        println!("Skipping file ID {}: {}", id, reason);
    }

    fn on_error(&self, url: &str, error: &str) {
        eprintln!("Error transferring {}: {}", url, error);
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}
