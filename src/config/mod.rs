//! Configuration management for the portal server and dispatcher
//!
//! Configuration is read from YAML, then environment variables are applied
//! on top, then the result is validated.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::client::ClientConfig;
use crate::utils::error::{PortalError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/portal.yaml";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Batch endpoint limits
    #[serde(default)]
    pub batch: BatchEndpointConfig,
    /// Dispatcher settings for clients built from this config
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file, apply environment overrides and validate
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PortalError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from a YAML string without validating it
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| PortalError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORTAL_*` environment variables on top of the current values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = env::var("PORTAL_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORTAL_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| PortalError::Config(format!("Invalid port: {}", e)))?;
        }
        if let Ok(max_requests) = env::var("PORTAL_BATCH_MAX_REQUESTS") {
            self.batch.max_requests = max_requests
                .parse()
                .map_err(|e| PortalError::Config(format!("Invalid batch max requests: {}", e)))?;
        }
        if let Ok(level) = env::var("PORTAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(base_url) = env::var("PORTAL_BASE_URL") {
            self.client.base_url = base_url;
        }
        Ok(())
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Get batch endpoint configuration
    pub fn batch(&self) -> &BatchEndpointConfig {
        &self.batch
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        Validate::validate(&self.server)
            .map_err(|e| PortalError::Config(format!("Server config error: {}", e)))?;
        Validate::validate(&self.batch)
            .map_err(|e| PortalError::Config(format!("Batch config error: {}", e)))?;
        Validate::validate(&self.client)
            .map_err(|e| PortalError::Config(format!("Client config error: {}", e)))?;
        Validate::validate(&self.logging)
            .map_err(|e| PortalError::Config(format!("Logging config error: {}", e)))?;

        if self.client.max_batch_size > self.batch.max_requests {
            return Err(PortalError::Config(format!(
                "Client max_batch_size ({}) exceeds batch max_requests ({})",
                self.client.max_batch_size, self.batch.max_requests
            )));
        }

        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| PortalError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
