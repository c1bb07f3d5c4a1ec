//! Dispatcher configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Settings of a [`BatchClient`](super::BatchClient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix of every URL, batched or direct
    #[serde(default)]
    pub base_url: String,
    /// Headers merged into every HTTP request
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
    /// Queue length that flushes immediately
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Debounce window in milliseconds
    #[serde(default = "default_batch_window_ms")]
    pub batch_window_ms: u64,
    /// When false every call is a direct HTTP request
    #[serde(default = "default_true")]
    pub enable_batching: bool,
    /// Retry transport failures of idempotent work
    #[serde(default)]
    pub retry_failed_requests: bool,
    /// Extra attempts when retries are enabled
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_headers: HashMap::new(),
            max_batch_size: default_max_batch_size(),
            batch_window_ms: default_batch_window_ms(),
            enable_batching: true,
            retry_failed_requests: false,
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Set the size trigger (at least 1)
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    pub fn with_batch_window(mut self, window: Duration) -> Self {
        self.batch_window_ms = window.as_millis() as u64;
        self
    }

    pub fn with_batching(mut self, enable_batching: bool) -> Self {
        self.enable_batching = enable_batching;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.retry_failed_requests = true;
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if !self.base_url.is_empty() && url::Url::parse(&self.base_url).is_err() {
            return Err(format!("Invalid base_url: {}", self.base_url));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    10
}

fn default_batch_window_ms() -> u64 {
    50
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}
