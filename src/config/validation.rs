//! Configuration validation

use super::models::*;
use crate::client::ClientConfig;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        ServerConfig::validate(self)
    }
}

impl Validate for BatchEndpointConfig {
    fn validate(&self) -> Result<(), String> {
        BatchEndpointConfig::validate(self)
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        LoggingConfig::validate(self)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), String> {
        ClientConfig::validate(self)
    }
}
