//! End-to-end tests: batch client against the portal server
//!
//! Every test starts its own server on an ephemeral port.

#[cfg(test)]
mod tests {
    use crate::common::TestServer;
    use portal_batch::config::BatchEndpointConfig;
    use portal_batch::services::{Lead, Service};
    use portal_batch::{ClientConfig, ClientError, QueryParams};
    use serde_json::{Value, json};
    use std::time::Duration;

    // ==================== Batched Path ====================

    #[actix_web::test]
    async fn test_concurrent_calls_resolve_through_one_batch() {
        let server = TestServer::start();
        let client = server.client(ClientConfig::new().with_batch_window(Duration::from_millis(50)));

        let (services, portfolio, lead) = tokio::join!(
            client.get::<Vec<Service>>("/api/services", None),
            client.get::<Vec<Value>>("/api/portfolio", Some(QueryParams::new().with("limit", 2))),
            client.post::<Lead>("/api/leads", Some(json!({"email": "ada@example.com", "name": "Ada"}))),
        );

        assert_eq!(services.unwrap().len(), 3);
        assert_eq!(portfolio.unwrap().len(), 2);
        let lead = lead.unwrap();
        assert_eq!(lead.email, "ada@example.com");

        let stats = client.stats();
        assert_eq!(stats.batches_sent, 1);
        assert_eq!(stats.requests_batched, 3);

        let fetched: Lead = client
            .get(&format!("/api/leads/{}", lead.id), None)
            .await
            .unwrap();
        assert_eq!(fetched, lead);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_sub_request_failure_only_affects_its_caller() {
        let server = TestServer::start();
        let client = server.client(ClientConfig::new());

        let (missing, unknown, invalid, services) = tokio::join!(
            client.get::<Value>("/api/services/nope", None),
            client.get::<Value>("/api/unknown", None),
            client.post::<Value>("/api/leads", Some(json!({"email": "nope"}))),
            client.get::<Vec<Service>>("/api/services", None),
        );

        assert!(matches!(missing, Err(ClientError::Request(ref m)) if m == "Not found: Service nope"));
        assert!(matches!(unknown, Err(ClientError::Request(ref m)) if m == "No route for GET /api/unknown"));
        assert!(matches!(invalid, Err(ClientError::Request(ref m)) if m.contains("Invalid email address")));
        assert_eq!(services.unwrap().len(), 3);
        assert_eq!(client.stats().batches_sent, 1);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_bad_target_does_not_reject_its_siblings() {
        let server = TestServer::start();
        let client = server.client(ClientConfig::new());

        let (relative, nested, portfolio, services) = tokio::join!(
            client.get::<Value>("api/services", None),
            client.get::<Value>("/api/batch", None),
            client.get::<Vec<Value>>("/api/portfolio", None),
            client.get::<Vec<Service>>("/api/services", None),
        );

        assert!(matches!(relative, Err(ClientError::Request(ref m)) if m.contains("Invalid path")));
        assert!(matches!(nested, Err(ClientError::Request(ref m)) if m.contains("Nested batch")));
        assert!(!portfolio.unwrap().is_empty());
        assert_eq!(services.unwrap().len(), 3);

        let stats = client.stats();
        assert_eq!(stats.batches_sent, 1);
        assert_eq!(stats.transport_failures, 0);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_size_limit_splits_into_several_batches() {
        let server = TestServer::start();
        let client = server.client(
            ClientConfig::new()
                .with_max_batch_size(2)
                .with_batch_window(Duration::from_secs(30)),
        );

        let paths: Vec<String> = ["mentorship", "code-review", "career-coaching", "mentorship"]
            .iter()
            .map(|id| format!("/api/services/{}", id))
            .collect();
        let calls = paths.iter().map(|path| client.get::<Service>(path, None));
        let results = tokio::time::timeout(Duration::from_secs(10), futures::future::join_all(calls))
            .await
            .expect("full batches flush without waiting for the window");

        let ids: Vec<String> = results.into_iter().map(|r| r.unwrap().id).collect();
        assert_eq!(ids, vec!["mentorship", "code-review", "career-coaching", "mentorship"]);
        assert_eq!(client.stats().batches_sent, 2);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_rejected_batch_fails_every_member() {
        let server = TestServer::start_with_batch(BatchEndpointConfig::default().with_max_requests(2));
        let client = server.client(ClientConfig::new().with_max_batch_size(3));

        let (a, b, c) = tokio::join!(
            client.get::<Value>("/api/services", None),
            client.get::<Value>("/api/portfolio", None),
            client.get::<Value>("/api/services/mentorship", None),
        );

        for result in [a, b, c] {
            let err = result.unwrap_err();
            assert!(matches!(err, ClientError::BatchFailed(_)), "got {:?}", err);
            assert!(err.to_string().contains("400"));
        }
        assert_eq!(client.stats().transport_failures, 1);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_lead_lifecycle_through_batches() {
        let server = TestServer::start();
        let client = server.client(ClientConfig::new().with_batch_window(Duration::from_millis(10)));

        let lead: Lead = client
            .post("/api/leads", Some(json!({"email": "grace@example.com", "source": "footer"})))
            .await
            .unwrap();
        assert_eq!(lead.source.as_deref(), Some("footer"));

        let deleted: Value = client
            .delete(&format!("/api/leads/{}", lead.id), None)
            .await
            .unwrap();
        assert_eq!(deleted, json!({"deleted": true}));

        let gone = client
            .get::<Value>(&format!("/api/leads/{}", lead.id), None)
            .await
            .unwrap_err();
        assert_eq!(gone.to_string(), format!("Not found: Lead {}", lead.id));

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_flush_sends_queued_requests_immediately() {
        let server = TestServer::start();
        let client = server.client(ClientConfig::new().with_batch_window(Duration::from_secs(30)));

        let pending = {
            let client = client.clone();
            tokio::spawn(async move { client.get::<Vec<Service>>("/api/services", None).await })
        };
        while client.queued() == 0 {
            tokio::task::yield_now().await;
        }

        tokio::time::timeout(Duration::from_secs(10), client.flush())
            .await
            .expect("flush completes without the window")
            .unwrap();
        assert_eq!(pending.await.unwrap().unwrap().len(), 3);

        server.stop().await;
    }

    // ==================== Direct Path ====================

    #[actix_web::test]
    async fn test_direct_and_batched_results_are_identical() {
        let server = TestServer::start();
        let batched = server.client(ClientConfig::new());
        let direct = server.client(ClientConfig::new().with_batching(false));

        for path in ["/api/services", "/api/services/code-review", "/api/portfolio"] {
            let via_batch: Value = batched.get(path, None).await.unwrap();
            let via_direct: Value = direct.get(path, None).await.unwrap();
            assert_eq!(via_batch, via_direct, "path: {}", path);
        }
        assert_eq!(direct.stats().batches_sent, 0);
        assert_eq!(direct.stats().direct_requests, 3);

        server.stop().await;
    }

    #[actix_web::test]
    async fn test_direct_errors_carry_status_and_message() {
        let server = TestServer::start();
        let direct = server.client(ClientConfig::new().with_batching(false));

        let err = direct
            .get::<Value>("/api/services/nope", None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Not found: Service nope");
        assert!(!err.is_transport());

        let err = direct
            .get::<Value>("/api/portfolio", Some(QueryParams::new().with("limit", "many")))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));

        server.stop().await;
    }
}
