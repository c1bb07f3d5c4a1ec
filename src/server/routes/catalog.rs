//! Portal catalog endpoints
//!
//! - `GET /api/services`, `GET /api/services/{id}`
//! - `GET /api/portfolio?limit=N`
//! - `POST /api/leads`, `GET /api/leads/{id}`, `DELETE /api/leads/{id}`

use crate::core::batch::HttpMethod;
use crate::server::registry::{RouteHandler, RouteTable, SubRequest, handler_fn};
use crate::services::{CatalogStore, NewLead};
use crate::utils::error::{PortalError, Result};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Register the catalog handlers
pub fn register_routes(table: &mut RouteTable, store: &Arc<CatalogStore>) {
    table
        .route(HttpMethod::Get, "/api/services", with_store(store, list_services))
        .route(HttpMethod::Get, "/api/services/{id}", with_store(store, get_service))
        .route(HttpMethod::Get, "/api/portfolio", with_store(store, list_portfolio))
        .route(HttpMethod::Post, "/api/leads", with_store(store, create_lead))
        .route(HttpMethod::Get, "/api/leads/{id}", with_store(store, get_lead))
        .route(HttpMethod::Delete, "/api/leads/{id}", with_store(store, delete_lead));
}

fn with_store<F, Fut>(store: &Arc<CatalogStore>, f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(Arc<CatalogStore>, SubRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    let store = Arc::clone(store);
    handler_fn(move |request| f(Arc::clone(&store), request))
}

async fn list_services(store: Arc<CatalogStore>, _request: SubRequest) -> Result<Value> {
    Ok(serde_json::to_value(store.services())?)
}

async fn get_service(store: Arc<CatalogStore>, request: SubRequest) -> Result<Value> {
    let id = request.path_param("id")?;
    let service = store
        .service(id)
        .ok_or_else(|| PortalError::not_found(format!("Service {}", id)))?;
    Ok(serde_json::to_value(service)?)
}

async fn list_portfolio(store: Arc<CatalogStore>, request: SubRequest) -> Result<Value> {
    let limit = request
        .query("limit")
        .map(|raw| {
            raw.parse::<usize>().map_err(|_| {
                PortalError::bad_request(format!("limit must be a non-negative integer, got {}", raw))
            })
        })
        .transpose()?;
    debug!(?limit, "Listing portfolio");
    Ok(serde_json::to_value(store.portfolio(limit))?)
}

async fn create_lead(store: Arc<CatalogStore>, request: SubRequest) -> Result<Value> {
    let new_lead: NewLead = request.json()?;
    let lead = store.create_lead(new_lead)?;
    info!(lead_id = %lead.id, source = ?lead.source, "Lead captured");
    Ok(serde_json::to_value(lead)?)
}

async fn get_lead(store: Arc<CatalogStore>, request: SubRequest) -> Result<Value> {
    let id = request.path_param("id")?;
    let lead = store
        .lead(id)
        .ok_or_else(|| PortalError::not_found(format!("Lead {}", id)))?;
    Ok(serde_json::to_value(lead)?)
}

async fn delete_lead(store: Arc<CatalogStore>, request: SubRequest) -> Result<Value> {
    let id = request.path_param("id")?;
    if !store.delete_lead(id) {
        return Err(PortalError::not_found(format!("Lead {}", id)));
    }
    Ok(json!({ "deleted": true }))
}
