//! Batched API client
//!
//! [`BatchClient`] looks like an ordinary async HTTP client, but calls issued
//! close together are coalesced into a single `POST /api/batch` and each
//! caller receives only its own result.
//!
//! ```rust,no_run
//! use portal_batch::client::{BatchClient, ClientConfig};
//! use serde_json::{Value, json};
//!
//! # async fn run() -> Result<(), portal_batch::client::ClientError> {
//! let client = BatchClient::new(ClientConfig::new().with_base_url("http://localhost:8080"))?;
//!
//! // Both calls travel in the same batch
//! let (services, lead) = tokio::join!(
//!     client.get::<Value>("/api/services", None),
//!     client.post::<Value>("/api/leads", Some(json!({"email": "a@b.com"}))),
//! );
//! # let _ = (services?, lead?);
//! # Ok(())
//! # }
//! ```

mod config;
mod default;
mod dispatcher;
mod errors;
mod request;
mod stats;
mod transport;


pub use config::ClientConfig;
pub use default::{default_client, reset_default_client, set_default_client};
pub use errors::{ClientError, Result};
pub use request::ClientRequest;
pub use stats::DispatcherStats;

use crate::core::batch::{HttpMethod, QueryParams};
use dispatcher::Dispatcher;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Coalescing HTTP client. Clones share one queue.
#[derive(Clone)]
pub struct BatchClient {
    inner: Arc<Dispatcher>,
}

impl std::fmt::Debug for BatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchClient")
            .field("config", self.inner.config())
            .finish()
    }
}

impl BatchClient {
    /// Create a new client. Must be used from within a tokio runtime.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let dispatcher = Dispatcher::new(config)?;
        info!(
            base_url = %dispatcher.config().base_url,
            max_batch_size = dispatcher.config().max_batch_size,
            batch_window_ms = dispatcher.config().batch_window_ms,
            batching = dispatcher.config().enable_batching,
            "BatchClient created"
        );
        Ok(Self {
            inner: Arc::new(dispatcher),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<QueryParams>,
    ) -> Result<T> {
        self.request(with_params(ClientRequest::get(path), params)).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(with_body(ClientRequest::post(path), body)).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(with_body(ClientRequest::put(path), body)).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(with_body(ClientRequest::patch(path), body)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<QueryParams>,
    ) -> Result<T> {
        self.request(with_params(ClientRequest::delete(path), params)).await
    }

    /// Issue a fully described request and decode its `data` into `T`
    pub async fn request<T: DeserializeOwned>(&self, request: ClientRequest) -> Result<T> {
        let value = self.inner.submit(request).await?;
        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Same as [`request`](Self::request) with an explicit method
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        self.request(with_body(ClientRequest::new(method, path), body)).await
    }

    /// Dispatch the queued requests now instead of waiting for the batch window.
    ///
    /// Resolves once that batch has completed. An empty queue is a no-op.
    pub async fn flush(&self) -> Result<()> {
        self.inner.flush().await
    }

    /// Requests waiting for the next flush
    pub fn queued(&self) -> usize {
        self.inner.queued()
    }

    pub fn stats(&self) -> DispatcherStats {
        self.inner.stats().snapshot()
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }
}

fn with_params(request: ClientRequest, params: Option<QueryParams>) -> ClientRequest {
    match params {
        Some(params) => request.params(params),
        None => request,
    }
}

fn with_body(request: ClientRequest, body: Option<Value>) -> ClientRequest {
    match body {
        Some(body) => request.body(body),
        None => request,
    }
}
