//! Execution of `/api/batch` payloads
//!
//! Every sub-request is resolved against the [`RouteTable`] and run in
//! isolation: handler errors, panics and timeouts become a failed result for
//! that id only. Results always come back in request order.

use super::registry::{RouteHandler, RouteTable, SubRequest};
use crate::config::BatchEndpointConfig;
use crate::core::batch::{
    BATCH_PATH, BatchRequest, BatchRequestPayload, BatchResponse, BatchResult, HttpMethod,
    QueryParams,
};
use crate::utils::error::{PortalError, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

type Outcome = std::result::Result<Value, String>;

/// GET outcomes shared within one batch when `useCache` is set and the
/// endpoint allows sharing
#[derive(Default)]
struct OutcomeCache {
    entries: Mutex<HashMap<String, Shared<BoxFuture<'static, Outcome>>>>,
}

impl OutcomeCache {
    async fn get_or_run<F>(&self, key: String, run: F) -> Outcome
    where
        F: FnOnce() -> BoxFuture<'static, Outcome>,
    {
        let shared = {
            let mut entries = self.entries.lock();
            entries
                .entry(key)
                .or_insert_with(|| run().shared())
                .clone()
        };
        shared.await
    }
}

/// Runs batch payloads against a route table
pub struct BatchExecutor {
    routes: Arc<RouteTable>,
    config: BatchEndpointConfig,
}

impl BatchExecutor {
    pub fn new(routes: Arc<RouteTable>, config: BatchEndpointConfig) -> Self {
        Self { routes, config }
    }

    pub fn config(&self) -> &BatchEndpointConfig {
        &self.config
    }

    /// Reject payloads that cannot be executed; nothing runs when this fails.
    /// Checks on a single sub-request's target happen in `run_one` instead.
    pub fn validate(&self, payload: &BatchRequestPayload) -> Result<()> {
        if payload.requests.is_empty() {
            return Err(PortalError::validation(
                "Batch must contain at least one request",
            ));
        }
        if payload.requests.len() > self.config.max_requests {
            return Err(PortalError::validation(format!(
                "Batch contains {} requests, the limit is {}",
                payload.requests.len(),
                self.config.max_requests
            )));
        }

        let mut seen = HashSet::with_capacity(payload.requests.len());
        for request in &payload.requests {
            if request.id.trim().is_empty() {
                return Err(PortalError::validation("Request id must not be empty"));
            }
            if !seen.insert(request.id.as_str()) {
                return Err(PortalError::validation(format!(
                    "Duplicate request id: {}",
                    request.id
                )));
            }
        }
        Ok(())
    }

    /// Validate and run a payload, one result per request in request order
    pub async fn execute(&self, payload: BatchRequestPayload) -> Result<BatchResponse> {
        self.validate(&payload)?;

        let BatchRequestPayload { requests, options } = payload;
        let concurrency = if options.parallel {
            self.config.max_concurrency.max(1)
        } else {
            1
        };
        let sharing = options.use_cache && self.config.share_identical_gets;
        let cache = sharing.then(OutcomeCache::default);
        debug!(
            requests = requests.len(),
            concurrency,
            use_cache = options.use_cache,
            sharing,
            "Executing batch"
        );

        let results: Vec<BatchResult> = stream::iter(requests)
            .map(|request| self.run_one(request, cache.as_ref()))
            .buffered(concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| !r.success).count();
        if failed > 0 {
            debug!(failed, total = results.len(), "Batch finished with failures");
        }
        Ok(BatchResponse { results })
    }

    async fn run_one(&self, request: BatchRequest, cache: Option<&OutcomeCache>) -> BatchResult {
        let BatchRequest {
            id,
            method,
            path,
            params,
            body,
            headers,
        } = request;

        if !path.starts_with('/') {
            return BatchResult::failure(
                id,
                PortalError::bad_request(format!("Invalid path: {}", path)).to_string(),
            );
        }
        let (path, query) = split_path(&path);
        if path == BATCH_PATH {
            return BatchResult::failure(
                id,
                PortalError::bad_request("Nested batch requests are not allowed").to_string(),
            );
        }

        let Some((handler, path_params)) = self.routes.resolve(method, path) else {
            return BatchResult::failure(id, format!("No route for {} {}", method, path));
        };

        // Explicit params win over the ones embedded in the path
        let mut merged = QueryParams::parse(query);
        for (key, value) in params.iter() {
            merged.insert(key, value);
        }

        let sub_request = SubRequest {
            method,
            path: path.to_string(),
            path_params,
            params: merged,
            headers: headers.unwrap_or_default(),
            body,
        };

        let outcome = match cache {
            Some(cache) if method == HttpMethod::Get => {
                let key = cache_key(&sub_request);
                cache
                    .get_or_run(key, || self.invoke(handler, sub_request))
                    .await
            }
            _ => self.invoke(handler, sub_request).await,
        };

        match outcome {
            Ok(data) => BatchResult::success(id, data),
            Err(message) => BatchResult::failure(id, message),
        }
    }

    fn invoke(
        &self,
        handler: Arc<dyn RouteHandler>,
        request: SubRequest,
    ) -> BoxFuture<'static, Outcome> {
        let timeout = self.config.request_timeout();
        let label = format!("{} {}", request.method, request.path);

        async move {
            let call = AssertUnwindSafe(handler.handle(request)).catch_unwind();
            match tokio::time::timeout(timeout, call).await {
                Ok(Ok(Ok(data))) => Ok(data),
                Ok(Ok(Err(e))) => Err(e.to_string()),
                Ok(Err(_)) => {
                    error!(route = %label, "Handler panicked inside batch");
                    Err(PortalError::internal("handler panicked").to_string())
                }
                Err(_) => {
                    warn!(route = %label, ?timeout, "Sub-request timed out");
                    Err(PortalError::timeout(format!(
                        "{} did not complete within {}ms",
                        label,
                        timeout.as_millis()
                    ))
                    .to_string())
                }
            }
        }
        .boxed()
    }
}

fn split_path(path: &str) -> (&str, &str) {
    path.split_once('?').unwrap_or((path, ""))
}

fn cache_key(request: &SubRequest) -> String {
    let headers: BTreeMap<String, &str> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.as_str()))
        .collect();
    format!(
        "{}?{}|{:?}",
        request.path,
        request.params.to_query_string(),
        headers
    )
}
