//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::server::executor::BatchExecutor;
use crate::server::registry::RouteTable;
use crate::server::routes;
use crate::services::CatalogStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// HTTP server state shared across handlers
///
/// The route table is shared by the mounted direct routes and the batch
/// executor, so both paths run the same handlers.
#[derive(Clone)]
pub struct AppState {
    /// Portal configuration (shared read-only)
    pub config: Arc<Config>,
    /// Registered portal routes
    pub routes: Arc<RouteTable>,
    /// `/api/batch` executor
    pub executor: Arc<BatchExecutor>,
    /// Catalog backing the sample routes
    pub catalog: Arc<CatalogStore>,
    started_at: Instant,
}

impl AppState {
    /// State with the seeded catalog and the default portal routes
    pub fn new(config: Config) -> Self {
        let catalog = Arc::new(CatalogStore::seeded());
        let table = routes::default_routes(&catalog);
        Self::with_routes(config, catalog, table)
    }

    /// State with a caller-supplied route table
    pub fn with_routes(config: Config, catalog: Arc<CatalogStore>, table: RouteTable) -> Self {
        let routes = Arc::new(table);
        let executor = Arc::new(BatchExecutor::new(
            Arc::clone(&routes),
            config.batch.clone(),
        ));

        Self {
            config: Arc::new(config),
            routes,
            executor,
            catalog,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
