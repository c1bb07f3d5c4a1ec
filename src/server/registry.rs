//! Route table shared by direct HTTP routes and the batch endpoint
//!
//! A handler is registered once and becomes reachable two ways: mounted on
//! the actix `App` at its own method and path, and resolved by the
//! [`BatchExecutor`](super::executor::BatchExecutor) for sub-requests.

use crate::core::batch::{HttpMethod, QueryParams};
use crate::utils::error::{PortalError, Result};
use actix_web::dev::{Path, ResourceDef};
use actix_web::{HttpRequest, HttpResponse, web};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A request as seen by a route handler, whichever way it arrived
#[derive(Debug, Clone, PartialEq)]
pub struct SubRequest {
    pub method: HttpMethod,
    /// Path without the query string
    pub path: String,
    /// Values captured by `{name}` segments
    pub path_params: HashMap<String, String>,
    pub params: QueryParams,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl SubRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: HashMap::new(),
            params: QueryParams::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key, value);
        self
    }

    /// A captured path segment; missing segments are a routing bug surfaced as 400
    pub fn path_param(&self, name: &str) -> Result<&str> {
        self.path_params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| PortalError::bad_request(format!("Missing path parameter: {}", name)))
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the JSON body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self
            .body
            .clone()
            .ok_or_else(|| PortalError::bad_request("Request body is required"))?;
        serde_json::from_value(body)
            .map_err(|e| PortalError::bad_request(format!("Invalid request body: {}", e)))
    }
}

/// Handler for one method and path pattern
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, request: SubRequest) -> Result<Value>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> RouteHandler for FnHandler<F>
where
    F: Fn(SubRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    async fn handle(&self, request: SubRequest) -> Result<Value> {
        (self.0)(request).await
    }
}

/// Wrap an async closure as a [`RouteHandler`]
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(SubRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

#[derive(Clone)]
struct Route {
    method: HttpMethod,
    pattern: String,
    resource: ResourceDef,
    handler: Arc<dyn RouteHandler>,
}

/// Registry of `(method, pattern) -> handler`
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.routes
                    .iter()
                    .map(|r| format!("{} {}", r.method, r.pattern)),
            )
            .finish()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. `pattern` uses `{name}` segments, e.g. `/api/leads/{id}`.
    pub fn route(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        handler: Arc<dyn RouteHandler>,
    ) -> &mut Self {
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            resource: ResourceDef::new(pattern),
            handler,
        });
        self
    }

    pub fn with_route(
        mut self,
        method: HttpMethod,
        pattern: &str,
        handler: Arc<dyn RouteHandler>,
    ) -> Self {
        self.route(method, pattern, handler);
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the handler for a method and a path without query string
    pub fn resolve(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> Option<(Arc<dyn RouteHandler>, HashMap<String, String>)> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                let mut target = Path::new(path.to_string());
                if !route.resource.capture_match_info(&mut target) {
                    return None;
                }
                let params = target
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                Some((Arc::clone(&route.handler), params))
            })
    }

    /// Mount every route on the actix app at its own path
    pub fn mount(&self, cfg: &mut web::ServiceConfig) {
        let mut patterns: Vec<&str> = Vec::new();
        for route in &self.routes {
            if !patterns.contains(&route.pattern.as_str()) {
                patterns.push(&route.pattern);
            }
        }

        // One resource per pattern so an unmatched method gets 405 instead of
        // falling through to 404
        for pattern in patterns {
            let mut resource = web::resource(pattern);
            for route in self.routes.iter().filter(|r| r.pattern == pattern) {
                let handler = Arc::clone(&route.handler);
                let method = route.method;
                resource = resource.route(web::method(to_actix_method(method)).to(
                    move |req: HttpRequest, body: web::Bytes| {
                        let handler = Arc::clone(&handler);
                        async move { serve_direct(handler, method, req, body).await }
                    },
                ));
            }
            debug!(pattern, "Mounted route");
            cfg.service(resource);
        }
    }
}

async fn serve_direct(
    handler: Arc<dyn RouteHandler>,
    method: HttpMethod,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let path_params = req
        .match_info()
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    let headers = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = if body.is_empty() {
        None
    } else {
        Some(
            serde_json::from_slice(&body)
                .map_err(|e| PortalError::bad_request(format!("Invalid JSON body: {}", e)))?,
        )
    };

    let request = SubRequest {
        method,
        path: req.path().to_string(),
        path_params,
        params: QueryParams::parse(req.query_string()),
        headers,
        body,
    };

    let data = handler.handle(request).await?;
    Ok(HttpResponse::Ok().json(data))
}

fn to_actix_method(method: HttpMethod) -> actix_web::http::Method {
    use actix_web::http::Method;
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}
