//! Error types for the transfer system with context and recovery information

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving endpoints and moving bytes
#[derive(Error, Debug)]
pub enum TransferError {
    /// HTTP-related errors with the URL that failed
    #[error("HTTP request to '{url}' failed")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Object-storage errors with bucket/key context
    #[error("object-storage request for 's3://{bucket}/{key}' failed: {message}")]
    ObjectStore {
        bucket: String,
        key: String,
        message: String,
    },

    /// The chosen endpoint could not be opened at all
    #[error("source '{url}' is unreachable: {reason}")]
    SourceUnreachable { url: String, reason: String },

    /// File system I/O errors with file context
    #[error("file operation failed on '{path}'")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// URL parsing errors
    #[error("invalid URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A URL whose scheme no source implementation handles
    #[error("unsupported protocol in '{url}' (supported: http, https, s3)")]
    UnsupportedProtocol { url: String },

    /// No candidate URL matched any priority tag; the entry is skippable
    #[error("no valid endpoint found for file ID '{id}'")]
    NoEndpoint { id: String },

    /// A priority string contained a tag the selector does not know
    #[error("unknown endpoint priority tag '{tag}' (expected one of HTTP, FTP, S3, FASP)")]
    UnknownPriorityTag { tag: String },
}

/// Types of file operations for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Create,
    Rename,
    Metadata,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Create => write!(f, "creating"),
            FileOperation::Rename => write!(f, "renaming"),
            FileOperation::Metadata => write!(f, "reading metadata"),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;

impl TransferError {
    /// Check if the error allows the driver to move on to the next entry
    ///
    /// Every variant is recoverable at the driver boundary; the distinction
    /// here is whether retrying the same entry could ever help.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransferError::HttpRequest { source, .. } => source
                .status()
                .map_or(true, |status| status.is_server_error() || status == 429),
            TransferError::ObjectStore { .. } => true,
            TransferError::SourceUnreachable { .. } => true,
            TransferError::FileSystem { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::TimedOut
            ),
            TransferError::InvalidUrl { .. } => false,
            TransferError::UnsupportedProtocol { .. } => false,
            TransferError::NoEndpoint { .. } => false,
            TransferError::UnknownPriorityTag { .. } => false,
        }
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            TransferError::HttpRequest { .. } => "http_request",
            TransferError::ObjectStore { .. } => "object_store",
            TransferError::SourceUnreachable { .. } => "source_unreachable",
            TransferError::FileSystem { .. } => "file_system",
            TransferError::InvalidUrl { .. } => "invalid_url",
            TransferError::UnsupportedProtocol { .. } => "unsupported_protocol",
            TransferError::NoEndpoint { .. } => "no_endpoint",
            TransferError::UnknownPriorityTag { .. } => "unknown_priority_tag",
        }
    }
}

impl From<reqwest::Error> for TransferError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        TransferError::HttpRequest { url, source: error }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(error: std::io::Error) -> Self {
        TransferError::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: FileOperation::Read,
            source: error,
        }
    }
}
