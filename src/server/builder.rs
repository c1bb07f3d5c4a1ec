//! Server builder and run_server function
//!
//! This module provides the ServerBuilder for easier server configuration
//! and the run_server function used by the binary.

use crate::config::Config;
use crate::server::registry::RouteTable;
use crate::server::server::HttpServer;
use crate::server::state::AppState;
use crate::services::CatalogStore;
use crate::utils::error::{PortalError, Result};
use std::sync::Arc;
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    routes: Option<RouteTable>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default portal routes
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Build the HTTP server
    pub fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| PortalError::Config("Configuration is required".to_string()))?;

        match self.routes {
            Some(routes) => {
                config.validate()?;
                let catalog = Arc::new(CatalogStore::seeded());
                Ok(HttpServer::from_state(AppState::with_routes(
                    config, catalog, routes,
                )))
            }
            None => HttpServer::new(&config),
        }
    }
}

/// Start the portal server with a loaded configuration
pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting portal batch server");

    let server = ServerBuilder::new().with_config(config).build()?;
    let server_config = server.config();
    info!(
        "Server starting at: http://{}:{}",
        server_config.host, server_config.port
    );
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /api/batch - Batch execution");
    info!(
        "   {} direct routes (services, portfolio, leads)",
        server.state().routes.len()
    );

    server.start().await
}
