//! Logical request description

use crate::core::batch::{BatchRequest, HttpMethod, QueryParams};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use super::errors::Result;

/// One logical call as issued by UI code, before it is tagged with an id
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRequest {
    pub method: HttpMethod,
    pub path: String,
    pub params: QueryParams,
    pub body: Option<Value>,
    pub headers: HashMap<String, String>,
}

impl ClientRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            body: None,
            headers: HashMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params.extend(params);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Tag the request with a correlation id for the batched path
    pub(crate) fn into_batch_request(self, id: String) -> BatchRequest {
        BatchRequest {
            id,
            method: self.method,
            path: self.path,
            params: self.params,
            body: self.body,
            headers: (!self.headers.is_empty()).then_some(self.headers),
        }
    }
}
