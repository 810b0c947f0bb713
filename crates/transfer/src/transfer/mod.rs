//! Transfer module
//!
//! Everything needed to move one manifest entry from its best endpoint to
//! verified local storage: core types, configuration, endpoint selection,
//! source implementations, the chunked downloader, and the manifest driver.

pub mod config;
pub mod core;
pub mod downloader;
pub mod driver;
pub mod endpoint;
pub mod sources;

// Re-export main types for convenience
pub use config::TransferConfig;
pub use core::{
    file_name_for_url, ConsoleProgressReporter, FileEntry, FileOperation, IntoProgressCallback,
    NullProgressReporter, ProgressCallback, ProgressEvent, ProgressReporter, Result,
    TransferError, TransferOutcome,
};
pub use downloader::RangeDownloader;
pub use driver::{EntryOutcome, EntryReport, TransferDriver, TransferReport};
pub use endpoint::{
    default_priorities, parse_priorities, CloudEnvironment, EndpointSelector, FixedEnvironment,
    InstanceMetadataProbe, Protocol,
};
pub use sources::{open_source, ObjectSource, StreamSource, TransferSource};
