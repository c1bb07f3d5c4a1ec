//! HTTP server implementation
//!
//! Serves the portal routes directly and through `POST /api/batch`. Both
//! paths dispatch into the same [`RouteTable`](registry::RouteTable).

pub mod middleware;
pub mod routes;

pub mod builder;
pub mod executor;
mod handlers;
pub mod registry;
pub mod server;
pub mod state;

#[cfg(test)]
mod tests;

pub use builder::{ServerBuilder, run_server};
pub use executor::BatchExecutor;
pub use registry::{RouteHandler, RouteTable, SubRequest, handler_fn};
pub use server::HttpServer;
pub use state::AppState;
