//! Batch endpoint configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied by the `/api/batch` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEndpointConfig {
    /// Maximum sub-requests accepted in one payload
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    /// Sub-requests running at once when `options.parallel` is set
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per sub-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Honor `options.useCache` by running identical GETs of one batch once.
    /// Off by default so every sub-request does its own work.
    #[serde(default)]
    pub share_identical_gets: bool,
}

impl Default for BatchEndpointConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            max_concurrency: default_max_concurrency(),
            request_timeout_ms: default_request_timeout_ms(),
            share_identical_gets: false,
        }
    }
}

impl BatchEndpointConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn with_max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_shared_gets(mut self, share_identical_gets: bool) -> Self {
        self.share_identical_gets = share_identical_gets;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_requests == 0 {
            return Err("max_requests must be greater than 0".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_max_requests() -> usize {
    50
}

fn default_max_concurrency() -> usize {
    10
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
