//! Object-storage source
//!
//! An `s3://bucket/key` URL is addressed as a keyed object: the size comes
//! from object metadata, and every block is an explicit byte-range read.
//! There is no persistent stream; exhaustion is signalled once the start
//! offset reaches the object size. Access is anonymous (unsigned).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use super::TransferSource;
use crate::transfer::config::TransferConfig;
use crate::transfer::core::error::{Result, TransferError};

pub struct ObjectSource {
    url: String,
    bucket: String,
    key: String,
    client: Client,
    total_size: u64,
}

impl ObjectSource {
    /// Open an object source and query its size
    ///
    /// A missing bucket or key is an unreachable source; the caller skips
    /// the entry rather than retrying.
    pub async fn open(url: &str, config: &TransferConfig) -> Result<Self> {
        let (bucket, key) = split_object_url(url)?;
        let client = build_client(config).await;

        let head = client
            .head_object()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| TransferError::SourceUnreachable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let total_size = head.content_length().unwrap_or(0).max(0) as u64;
        debug!("Opened object s3://{}/{} ({} bytes)", bucket, key, total_size);

        Ok(Self {
            url: url.to_string(),
            bucket,
            key,
            client,
            total_size,
        })
    }
}

#[async_trait]
impl TransferSource for ObjectSource {
    fn total_size(&self) -> u64 {
        self.total_size
    }

    /// One ranged read per call; `None` once the cursor passes the object end
    async fn fetch_range(&mut self, start: u64, end: u64) -> Result<Option<Bytes>> {
        if start >= self.total_size {
            return Ok(None);
        }

        // Leave the range open-ended when the requested end would run past
        // the object; the store clamps the final block for us.
        let range = if end <= self.total_size {
            format!("bytes={}-{}", start, end)
        } else {
            format!("bytes={}-", start)
        };

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .range(range)
            .send()
            .await
            .map_err(|e| TransferError::ObjectStore {
                bucket: self.bucket.clone(),
                key: self.key.clone(),
                message: e.to_string(),
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| TransferError::ObjectStore {
                bucket: self.bucket.clone(),
                key: self.key.clone(),
                message: e.to_string(),
            })?
            .into_bytes();

        Ok(Some(data))
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// Split `s3://bucket/key/with/slashes` into bucket and key
fn split_object_url(url: &str) -> Result<(String, String)> {
    let stripped = url
        .strip_prefix("s3://")
        .or_else(|| url.strip_prefix("S3://"))
        .ok_or_else(|| TransferError::UnsupportedProtocol {
            url: url.to_string(),
        })?;
    match stripped.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(TransferError::InvalidUrl {
            url: url.to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        }),
    }
}

/// Anonymous client; public manifests never need credentials
async fn build_client(config: &TransferConfig) -> Client {
    let shared = aws_config::defaults(BehaviorVersion::latest())
        .no_credentials()
        .region(Region::new(config.object_store_region.clone()))
        .load()
        .await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = &config.object_store_endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    Client::from_conf(builder.build())
}
