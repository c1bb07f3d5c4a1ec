//! # portal-batch
//!
//! Request batching for the coaching portal.
//!
//! ## Features
//!
//! - **Batch client**: independent async calls issued close together are
//!   coalesced into one `POST /api/batch`, and each caller gets its own result
//! - **Batch endpoint**: an actix-web server that executes sub-requests
//!   against the same handlers it serves directly, with per-request isolation
//! - **Portal catalog**: services, portfolio and lead routes to batch against
//!
//! ## Client
//!
//! ```rust,no_run
//! use portal_batch::{BatchClient, ClientConfig};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BatchClient::new(ClientConfig::new().with_base_url("http://localhost:8080"))?;
//!
//!     let (services, portfolio) = tokio::join!(
//!         client.get::<Value>("/api/services", None),
//!         client.get::<Value>("/api/portfolio", None),
//!     );
//!     println!("{} / {}", services?, portfolio?);
//!     Ok(())
//! }
//! ```
//!
//! ## Server
//!
//! ```rust,no_run
//! use portal_batch::{Config, server::HttpServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/portal.yaml").await?;
//!     HttpServer::new(&config)?.start().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod client;
pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod utils;

// Re-export main types
pub use client::{
    BatchClient, ClientConfig, ClientError, ClientRequest, DispatcherStats, default_client,
};
pub use config::Config;
pub use core::batch::{
    BatchOptions, BatchRequest, BatchRequestPayload, BatchResponse, BatchResult, HttpMethod,
    QueryParams,
};
pub use utils::error::{PortalError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata captured by `build.rs`
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Seconds since the epoch
    pub build_time: &'static str,
    pub git_hash: &'static str,
    pub rust_version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        build_time: env!("BUILD_TIME"),
        git_hash: env!("GIT_HASH"),
        rust_version: env!("RUST_VERSION"),
    }
}
