//! HTTP transport for batched and direct calls

use super::config::ClientConfig;
use super::errors::{ClientError, Result};
use super::request::ClientRequest;
use super::stats::StatsCollector;
use crate::core::batch::{BATCH_PATH, BatchRequestPayload, BatchResponse, HttpMethod};
use crate::utils::retry::{RetryConfig, RetryPolicy};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    default_headers: HeaderMap,
    retry_enabled: bool,
    max_retries: u32,
    retry_base_delay: std::time::Duration,
    stats: Arc<StatsCollector>,
}

impl Transport {
    pub(crate) fn new(config: &ClientConfig, stats: Arc<StatsCollector>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_headers: build_headers(&config.default_headers)?,
            retry_enabled: config.retry_failed_requests,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay(),
            stats,
        })
    }

    fn retry_policy(&self, idempotent: bool) -> RetryPolicy {
        if self.retry_enabled && idempotent {
            RetryPolicy::new(RetryConfig::with_retries(
                self.max_retries,
                self.retry_base_delay,
            ))
        } else {
            RetryPolicy::new(RetryConfig::none())
        }
    }

    /// POST the payload to the batch endpoint
    pub(crate) async fn send_batch(&self, payload: &BatchRequestPayload) -> Result<BatchResponse> {
        let policy = self.retry_policy(payload.is_idempotent());
        let mut attempts = 0u32;

        let outcome = policy
            .call_if(
                || {
                    attempts += 1;
                    self.post_batch(payload)
                },
                ClientError::is_retryable,
            )
            .await;

        self.stats.record_retries(attempts);
        if outcome.is_err() {
            self.stats.record_transport_failure();
        }
        outcome
    }

    async fn post_batch(&self, payload: &BatchRequestPayload) -> Result<BatchResponse> {
        let url = format!("{}{}", self.base_url, BATCH_PATH);
        debug!(url = %url, requests = payload.requests.len(), "Posting batch");

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Batch endpoint returned an error status");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .json::<BatchResponse>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Send one request on its own, bypassing the batch endpoint
    pub(crate) async fn send_direct(&self, request: &ClientRequest) -> Result<Value> {
        self.stats.record_direct();
        let policy = self.retry_policy(request.method.is_idempotent());
        let mut attempts = 0u32;

        let outcome = policy
            .call_if(
                || {
                    attempts += 1;
                    self.execute_direct(request)
                },
                ClientError::is_retryable,
            )
            .await;

        self.stats.record_retries(attempts);
        if matches!(&outcome, Err(e) if e.is_transport()) {
            self.stats.record_transport_failure();
        }
        outcome
    }

    async fn execute_direct(&self, request: &ClientRequest) -> Result<Value> {
        let mut url = format!("{}{}", self.base_url, request.path);
        if !request.params.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&request.params.to_query_string());
        }
        debug!(method = %request.method, url = %url, "Sending direct request");

        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), &url)
            .headers(self.default_headers.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| extract_error_message(&body))
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn build_headers(headers: &std::collections::HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::Config(format!("Invalid header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            ClientError::Config(format!("Invalid header value for '{}': {}", name, e))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Pull a message out of `{"error": "..."}` or `{"error": {"message": "..."}}`
pub(crate) fn extract_error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
