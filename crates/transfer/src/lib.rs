//! Transfer Library
//!
//! A resumable, multi-endpoint file-transfer client. Each manifest entry
//! names several candidate URLs for the same bytes plus an expected MD5;
//! the library picks the best endpoint by protocol priority, streams the
//! file in bounded blocks with resume support, and only promotes the
//! result after the checksum matches.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use transfer::{
//!     EndpointSelector, FileEntry, FixedEnvironment, TransferConfig, TransferDriver,
//! };
//!
//! # async fn example() -> transfer::Result<()> {
//! let config = TransferConfig::default();
//!
//! // Empty priority string: the ordering is derived from the environment
//! let selector = EndpointSelector::from_priority_string("", &FixedEnvironment(false)).await?;
//!
//! let entries = vec![FileEntry::from_joined_urls(
//!     "0a312f",
//!     "http://example.org/data/sample.fastq,s3://example-bucket/data/sample.fastq",
//!     "5d41402abc4b2a76b9719d911017c592",
//! )];
//!
//! let driver = TransferDriver::new(selector, config);
//! let report = driver.run(&entries, std::path::Path::new("/tmp/out"), None).await;
//! println!("{} completed", report.completed());
//! # Ok(())
//! # }
//! ```

pub mod transfer;

// Flatten the public surface so callers use `transfer::TransferDriver`
// rather than `transfer::transfer::TransferDriver`.
pub use crate::transfer::*;
