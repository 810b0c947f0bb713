//! Configuration types for the transfer system

use std::time::Duration;

/// Configuration for transfer operations
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Bytes requested per loop iteration
    pub block_size: usize,
    /// Timeout for opening a source and for metadata queries
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Timeout for one instance-metadata probe attempt
    pub probe_timeout: Duration,
    /// Additional probe attempts after the first failure
    pub probe_retries: usize,
    /// Region used for anonymous object-storage requests
    pub object_store_region: String,
    /// Override the object-storage endpoint (tests point this at a mock)
    pub object_store_endpoint: Option<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            block_size: 8192,
            connect_timeout: Duration::from_secs(30),
            user_agent: format!("transfer/{}", env!("CARGO_PKG_VERSION")),
            probe_timeout: Duration::from_millis(500),
            probe_retries: 1,
            object_store_region: "us-east-1".to_string(),
            object_store_endpoint: None,
        }
    }
}

impl TransferConfig {
    /// Block size as u64 for offset arithmetic
    pub fn block_size_u64(&self) -> u64 {
        self.block_size as u64
    }
}
