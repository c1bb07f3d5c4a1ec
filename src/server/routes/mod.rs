//! HTTP route modules
//!
//! - **batch**: `POST /api/batch`
//! - **catalog**: services, portfolio and leads, reachable directly and through the batch endpoint

pub mod batch;
pub mod catalog;

use crate::server::registry::RouteTable;
use crate::services::CatalogStore;
use std::sync::Arc;

/// Route table with every portal route registered
pub fn default_routes(catalog: &Arc<CatalogStore>) -> RouteTable {
    let mut table = RouteTable::new();
    catalog::register_routes(&mut table, catalog);
    table
}
