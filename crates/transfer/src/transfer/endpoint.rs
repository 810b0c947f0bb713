//! Endpoint selection
//!
//! A manifest entry carries several candidate URLs for the same bytes. The
//! selector ranks them by protocol priority: tag-major, URL-minor. The first
//! candidate whose scheme matches the highest-ranked tag wins; there is no
//! per-protocol "best URL" comparison across tags.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::transfer::config::TransferConfig;
use crate::transfer::core::error::{Result, TransferError};

/// Protocol tag used to rank candidate URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Object storage (`s3://`)
    S3,
    /// Generic byte stream; the `http` prefix also covers `https`
    Http,
    Ftp,
    /// Accelerated transfer (`fasp://`), deprioritized by the defaults
    Fasp,
}

impl Protocol {
    /// Scheme prefix a candidate URL must start with to match this tag
    pub fn scheme_prefix(&self) -> &'static str {
        match self {
            Protocol::S3 => "s3",
            Protocol::Http => "http",
            Protocol::Ftp => "ftp",
            Protocol::Fasp => "fasp",
        }
    }

    fn matches(&self, url: &str) -> bool {
        url.to_ascii_lowercase().starts_with(self.scheme_prefix())
    }
}

impl std::str::FromStr for Protocol {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S3" => Ok(Protocol::S3),
            "HTTP" => Ok(Protocol::Http),
            "FTP" => Ok(Protocol::Ftp),
            "FASP" => Ok(Protocol::Fasp),
            other => Err(TransferError::UnknownPriorityTag {
                tag: other.to_string(),
            }),
        }
    }
}

/// Parse a comma-joined, case-insensitive priority string.
///
/// An empty string yields an empty list, which callers replace with the
/// environment-derived defaults.
pub fn parse_priorities(list: &str) -> Result<Vec<Protocol>> {
    list.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::parse)
        .collect()
}

/// Default priority ordering when the caller supplied none.
///
/// On a cloud instance the object store is closest, so it goes first;
/// elsewhere the generic stream endpoint is preferred. The low-bandwidth
/// accelerated-transfer protocol is last either way.
pub fn default_priorities(on_cloud_instance: bool) -> Vec<Protocol> {
    if on_cloud_instance {
        vec![Protocol::S3, Protocol::Http, Protocol::Ftp, Protocol::Fasp]
    } else {
        vec![Protocol::Http, Protocol::Ftp, Protocol::S3, Protocol::Fasp]
    }
}

/// Signal for "is this process running inside the expected cloud environment"
///
/// Used only to pick a default priority ordering; a trait so tests can
/// simulate the signal without a metadata service.
#[async_trait]
pub trait CloudEnvironment: Send + Sync {
    async fn is_cloud_instance(&self) -> bool;
}

/// EC2 instance-metadata probe with a short timeout and bounded retries
pub struct InstanceMetadataProbe {
    client: reqwest::Client,
    endpoint: String,
    retries: usize,
}

const INSTANCE_METADATA_URL: &str = "http://169.254.169.254/latest/meta-data/";

impl InstanceMetadataProbe {
    pub fn new(config: &TransferConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.probe_timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: INSTANCE_METADATA_URL.to_string(),
            retries: config.probe_retries,
        }
    }

    /// Probe against a non-default endpoint (tests)
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl CloudEnvironment for InstanceMetadataProbe {
    async fn is_cloud_instance(&self) -> bool {
        for attempt in 0..=self.retries {
            match self.client.get(&self.endpoint).send().await {
                Ok(response) if response.status().is_success() => return true,
                Ok(response) => {
                    debug!("Instance metadata probe got status {}", response.status());
                    return false;
                }
                Err(e) => {
                    debug!("Instance metadata probe attempt {} failed: {}", attempt, e);
                }
            }
        }
        false
    }
}

/// A fixed cloud signal, for callers that already know where they run
pub struct FixedEnvironment(pub bool);

#[async_trait]
impl CloudEnvironment for FixedEnvironment {
    async fn is_cloud_instance(&self) -> bool {
        self.0
    }
}

/// Ranks candidate URLs by protocol priority
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    priorities: Vec<Protocol>,
}

impl EndpointSelector {
    pub fn new(priorities: Vec<Protocol>) -> Self {
        Self { priorities }
    }

    /// Build a selector from a priority string, probing the environment for
    /// a default ordering when the string is empty.
    pub async fn from_priority_string(list: &str, environment: &dyn CloudEnvironment) -> Result<Self> {
        let mut priorities = parse_priorities(list)?;
        if priorities.is_empty() {
            let on_cloud = environment.is_cloud_instance().await;
            debug!("No priorities given, cloud instance signal: {}", on_cloud);
            priorities = default_priorities(on_cloud);
        }
        Ok(Self::new(priorities))
    }

    pub fn priorities(&self) -> &[Protocol] {
        &self.priorities
    }

    /// Pick the single best URL, or `None` when no candidate matches any
    /// priority tag (the entry has no usable endpoint and should be skipped).
    pub fn select(&self, urls: &[String]) -> Option<String> {
        self.select_ordered(urls).into_iter().next()
    }

    /// All matching URLs in tag-major, URL-minor order. The head of the list
    /// is what `select` returns; the tail is the fallback chain the driver
    /// walks when an endpoint turns out to be unreachable.
    pub fn select_ordered(&self, urls: &[String]) -> Vec<String> {
        let mut ordered = Vec::new();
        for tag in &self.priorities {
            for url in urls {
                if tag.matches(url) && !ordered.contains(url) {
                    ordered.push(url.clone());
                }
            }
        }
        ordered.into_iter().map(|u| rewrite_legacy_demo_url(&u)).collect()
    }
}

/// Legacy bucket layout patch
///
/// Some manifests still point at the invalid HMDEMO bucket layout. Rewrite
/// those object URLs into the corrected DEMO bucket/key shape. This is a
/// data-correctness patch for known-bad source records, kept in one place so
/// it can be deleted once the upstream data is fixed; every other URL passes
/// through untouched.
pub fn rewrite_legacy_demo_url(url: &str) -> String {
    if !(url.contains("s3://") && url.contains("HMDEMO")) {
        return url.to_string();
    }

    let elements: Vec<&str> = url.split('/').collect();
    if elements.len() < 5 {
        warn!("Legacy HMDEMO URL too short to rewrite: {}", url);
        return url.to_string();
    }

    let tail = &elements[elements.len() - 4..];
    let rewritten = format!(
        "s3://{}/DEMO/{}/{}",
        elements[2],
        elements[4],
        tail.join("/")
    );
    debug!("Rewrote legacy URL {} to {}", url, rewritten);
    rewritten
}
