//! Generic HTTP stream source
//!
//! The remote is treated as one continuous byte stream. A `Range:
//! bytes=<resume>-` header is sent exactly once, when the response is
//! opened, to seek to the resume offset; after that every read is a
//! sequential block off the open body, not a re-requested range.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::StatusCode;
use tracing::debug;

use super::TransferSource;
use crate::transfer::config::TransferConfig;
use crate::transfer::core::error::{Result, TransferError};

pub struct StreamSource {
    url: String,
    total_size: u64,
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    /// Carry-over between network chunks and fixed-size blocks
    buffer: BytesMut,
    exhausted: bool,
}

impl StreamSource {
    /// Open the stream at `resume_offset`
    ///
    /// The total size is taken from a HEAD request rather than the ranged
    /// response, so a resumed transfer still sees the full file length.
    pub async fn open(url: &str, resume_offset: u64, config: &TransferConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let head = client
            .head(url)
            .send()
            .await
            .map_err(|e| TransferError::SourceUnreachable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !head.status().is_success() {
            return Err(TransferError::SourceUnreachable {
                url: url.to_string(),
                reason: format!("size query returned {}", head.status()),
            });
        }
        // `content_length()` reflects the (empty) HEAD body, not the header,
        // so the advertised size has to come off the header itself.
        let total_size = head
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0);

        let mut request = client.get(url);
        if resume_offset > 0 {
            request = request.header("Range", format!("bytes={}-", resume_offset));
            debug!("Requesting range: bytes={}-", resume_offset);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransferError::SourceUnreachable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if status == StatusCode::RANGE_NOT_SATISFIABLE && resume_offset > 0 {
            // The partial file already holds every byte the server has.
            // Hand back an exhausted source so the caller falls through to
            // verification instead of treating this as an open failure.
            debug!("Range at {} not satisfiable, nothing left to fetch", resume_offset);
            return Ok(Self {
                url: url.to_string(),
                total_size,
                body: futures::stream::empty().boxed(),
                buffer: BytesMut::new(),
                exhausted: true,
            });
        }
        if !status.is_success() && status != StatusCode::PARTIAL_CONTENT {
            return Err(TransferError::SourceUnreachable {
                url: url.to_string(),
                reason: format!("open returned {}", status),
            });
        }

        Ok(Self {
            url: url.to_string(),
            total_size,
            body: response.bytes_stream().boxed(),
            buffer: BytesMut::new(),
            exhausted: false,
        })
    }
}

#[async_trait]
impl TransferSource for StreamSource {
    fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Serve up to `end - start + 1` bytes from the open body
    ///
    /// The offsets are not re-requested; the stream position already is the
    /// download cursor. Network chunks rarely align with the block size, so
    /// a carry-over buffer slices them into bounded blocks.
    async fn fetch_range(&mut self, start: u64, end: u64) -> Result<Option<Bytes>> {
        let block_size = (end.saturating_sub(start) + 1) as usize;

        while self.buffer.len() < block_size && !self.exhausted {
            match self.body.next().await {
                Some(chunk) => {
                    let chunk = chunk.map_err(|e| TransferError::HttpRequest {
                        url: self.url.clone(),
                        source: e,
                    })?;
                    self.buffer.extend_from_slice(&chunk);
                }
                None => self.exhausted = true,
            }
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }

        let take = block_size.min(self.buffer.len());
        Ok(Some(self.buffer.split_to(take).freeze()))
    }

    fn url(&self) -> &str {
        &self.url
    }
}
