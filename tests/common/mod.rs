//! Common test utilities for portal-batch
//!
//! ```rust,ignore
//! use crate::common::TestServer;
//!
//! #[actix_web::test]
//! async fn my_test() {
//!     let server = TestServer::start();
//!     let client = server.client(ClientConfig::new());
//!     // ...
//!     server.stop().await;
//! }
//! ```

use actix_web::dev::ServerHandle;
use portal_batch::config::{BatchEndpointConfig, Config};
use portal_batch::server::HttpServer;
use portal_batch::{BatchClient, ClientConfig};
use std::net::TcpListener;

/// Portal server listening on `127.0.0.1` with an OS-assigned port
pub struct TestServer {
    pub base_url: String,
    handle: ServerHandle,
}

impl TestServer {
    /// Start a server with default limits. Must be called inside an actix runtime.
    pub fn start() -> Self {
        Self::start_with_batch(BatchEndpointConfig::default())
    }

    pub fn start_with_batch(batch: BatchEndpointConfig) -> Self {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.workers = Some(1);
        config.client.max_batch_size = config.client.max_batch_size.min(batch.max_requests);
        config.batch = batch;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        let server = HttpServer::new(&config)
            .expect("valid test config")
            .listen(listener)
            .expect("listen on bound socket");

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }

    /// Client pointed at this server
    pub fn client(&self, config: ClientConfig) -> BatchClient {
        BatchClient::new(config.with_base_url(&self.base_url)).expect("valid client config")
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
