//! Configuration validation integration tests
//!
//! Verifies that configuration validates correctly and fails appropriately
//! for invalid values in each section.

#[cfg(test)]
mod tests {
    use portal_batch::config::{BatchEndpointConfig, Config, LoggingConfig, ServerConfig, Validate};
    use portal_batch::server::ServerBuilder;
    use portal_batch::{BatchClient, ClientConfig, ClientError, PortalError};
    use std::time::Duration;

    // ==================== Server ====================

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_server_zero_timeout_rejected() {
        let config = ServerConfig {
            timeout: 0,
            ..Default::default()
        };
        let err = Validate::validate(&config).unwrap_err();
        assert!(err.contains("Timeout"));
    }

    #[test]
    fn test_builder_requires_config() {
        let result = ServerBuilder::new().build();
        assert!(matches!(result, Err(PortalError::Config(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_batch_limits() {
        let mut config = Config::default();
        config.batch = BatchEndpointConfig::default().with_request_timeout(Duration::ZERO);
        let result = ServerBuilder::new().with_config(config).build();
        assert!(matches!(result, Err(PortalError::Config(_))));
    }

    // ==================== Batch Endpoint ====================

    #[test]
    fn test_batch_defaults() {
        let batch = BatchEndpointConfig::default();
        assert_eq!(batch.max_requests, 50);
        assert_eq!(batch.max_concurrency, 10);
        assert_eq!(batch.request_timeout(), Duration::from_secs(10));
        assert!(Validate::validate(&batch).is_ok());
    }

    #[test]
    fn test_batch_zero_max_requests_rejected() {
        let batch = BatchEndpointConfig::default().with_max_requests(0);
        assert!(Validate::validate(&batch).is_err());
    }

    #[test]
    fn test_client_batch_size_above_server_limit_rejected() {
        let config = Config::from_yaml(
            r#"
client:
  max_batch_size: 60
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, PortalError::Config(ref m) if m.contains("max_batch_size")));
    }

    #[test]
    fn test_client_batch_size_equal_to_server_limit_accepted() {
        let mut config = Config::default();
        config.batch = BatchEndpointConfig::default().with_max_requests(10);
        config.client = ClientConfig::new().with_max_batch_size(10);
        assert!(config.validate().is_ok());
    }

    // ==================== Logging ====================

    #[test]
    fn test_empty_log_level_rejected() {
        let logging = LoggingConfig {
            level: "  ".to_string(),
            ..Default::default()
        };
        assert!(Validate::validate(&logging).is_err());
    }

    // ==================== Client ====================

    #[test]
    fn test_client_section_parsed_from_yaml() {
        let config = Config::from_yaml(
            r#"
client:
  base_url: "http://portal.internal:8080"
  enable_batching: false
  retry_failed_requests: true
  max_retries: 5
"#,
        )
        .unwrap();

        assert_eq!(config.client.base_url, "http://portal.internal:8080");
        assert!(!config.client.enable_batching);
        assert!(config.client.retry_failed_requests);
        assert_eq!(config.client.max_retries, 5);
        assert_eq!(config.client.max_batch_size, 10);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_client_rejects_invalid_config() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::new()
        };
        assert!(matches!(BatchClient::new(config), Err(ClientError::Config(_))));
    }
}
