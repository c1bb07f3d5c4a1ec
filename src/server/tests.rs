//! Tests for server module
//!
//! Direct routes and the batch endpoint are driven through the full actix app.

#[cfg(test)]
mod tests {
    use crate::config::{BatchEndpointConfig, Config};
    use crate::core::batch::{BatchResponse, HttpMethod};
    use crate::server::registry::{RouteHandler, RouteTable, SubRequest, handler_fn};
    use crate::server::routes;
    use crate::server::server::HttpServer;
    use crate::server::state::AppState;
    use crate::services::CatalogStore;
    use crate::utils::error::{ErrorResponse, PortalError, Result};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Exploding;

    #[async_trait]
    impl RouteHandler for Exploding {
        async fn handle(&self, _request: SubRequest) -> Result<Value> {
            panic!("handler exploded")
        }
    }

    struct Fixture {
        state: AppState,
        hits: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<String>>>,
    }

    fn fixture() -> Fixture {
        let hits = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));
        let catalog = Arc::new(CatalogStore::seeded());
        let mut table = routes::default_routes(&catalog);

        let counter = Arc::clone(&hits);
        let seen = Arc::clone(&order);
        table
            .route(HttpMethod::Get, "/test/panic", Arc::new(Exploding))
            .route(
                HttpMethod::Get,
                "/test/count",
                handler_fn(move |_request| {
                    let counter = Arc::clone(&counter);
                    async move { Ok(json!(counter.fetch_add(1, Ordering::SeqCst) + 1)) }
                }),
            )
            .route(
                HttpMethod::Get,
                "/test/slow",
                handler_fn(|_request| async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(Value::Null)
                }),
            )
            .route(
                HttpMethod::Get,
                "/test/order/{n}",
                handler_fn(move |request| {
                    let seen = Arc::clone(&seen);
                    async move {
                        let n = request.path_param("n")?.to_string();
                        // Later requests finish faster, so any overlap would reorder
                        let delay = 40u64.saturating_sub(n.parse::<u64>().unwrap_or(0) * 10);
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        seen.lock().push(n.clone());
                        Ok(json!(n))
                    }
                }),
            );

        let mut config = Config::default();
        config.batch = BatchEndpointConfig::default()
            .with_max_requests(8)
            .with_request_timeout(Duration::from_millis(100))
            .with_shared_gets(true);

        Fixture {
            state: AppState::with_routes(config, catalog, table),
            hits,
            order,
        }
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(HttpServer::create_app(web::Data::new($state.clone()))).await
        };
    }

    macro_rules! batch_request {
        ($payload:expr) => {
            test::TestRequest::post()
                .uri("/api/batch")
                .set_json($payload)
                .to_request()
        };
    }

    // ==================== Direct Routes ====================

    #[actix_web::test]
    async fn test_health_check() {
        let fx = fixture();
        let app = app!(fx.state);

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn test_direct_catalog_routes() {
        let fx = fixture();
        let app = app!(fx.state);

        let services: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/services").to_request(),
        )
        .await;
        assert_eq!(services.as_array().map(Vec::len), Some(3));

        let portfolio: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/portfolio?limit=2")
                .to_request(),
        )
        .await;
        assert_eq!(portfolio.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn test_direct_not_found_uses_error_body() {
        let fx = fixture();
        let app = app!(fx.state);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/services/nope").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.code, "NOT_FOUND");
        assert_eq!(body.error.message, "Not found: Service nope");
    }

    #[actix_web::test]
    async fn test_direct_wrong_method_is_405() {
        let fx = fixture();
        let app = app!(fx.state);

        let resp = test::call_service(
            &app,
            test::TestRequest::delete().uri("/api/services").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn test_direct_lead_lifecycle() {
        let fx = fixture();
        let app = app!(fx.state);

        let lead: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/leads")
                .set_json(json!({"email": "ada@example.com", "source": "footer"}))
                .to_request(),
        )
        .await;
        let id = lead["id"].as_str().unwrap().to_string();

        let deleted: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/leads/{}", id))
                .to_request(),
        )
        .await;
        assert_eq!(deleted, json!({"deleted": true}));

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/leads/{}", id))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    // ==================== Batch Endpoint ====================

    #[actix_web::test]
    async fn test_batch_mixed_requests_in_order() {
        let fx = fixture();
        let app = app!(fx.state);

        let response: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({
                "requests": [
                    {"id": "services", "method": "GET", "path": "/api/services"},
                    {"id": "portfolio", "method": "GET", "path": "/api/portfolio", "params": {"limit": 1}},
                    {"id": "lead", "method": "POST", "path": "/api/leads", "body": {"email": "a@b.com"}},
                    {"id": "one", "method": "GET", "path": "/api/services/code-review"}
                ]
            })),
        )
        .await;

        let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["services", "portfolio", "lead", "one"]);
        assert!(response.results.iter().all(|r| r.success));
        assert_eq!(response.results[1].data.as_ref().unwrap().as_array().unwrap().len(), 1);
        assert_eq!(response.results[2].data.as_ref().unwrap()["email"], "a@b.com");
        assert_eq!(response.results[3].data.as_ref().unwrap()["id"], "code-review");
        assert_eq!(fx.state.catalog.lead_count(), 1);
    }

    #[actix_web::test]
    async fn test_batch_failures_are_isolated() {
        let fx = fixture();
        let app = app!(fx.state);

        let response: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({
                "requests": [
                    {"id": "boom", "method": "GET", "path": "/test/panic"},
                    {"id": "missing", "method": "GET", "path": "/api/nope"},
                    {"id": "invalid", "method": "POST", "path": "/api/leads", "body": {"email": "bad"}},
                    {"id": "slow", "method": "GET", "path": "/test/slow"},
                    {"id": "gone", "method": "GET", "path": "/api/leads/unknown"},
                    {"id": "ok", "method": "GET", "path": "/api/services"}
                ]
            })),
        )
        .await;

        let index = response.into_index();
        assert_eq!(
            index["boom"].error.as_deref(),
            Some("Internal server error: handler panicked")
        );
        assert_eq!(
            index["missing"].error.as_deref(),
            Some("No route for GET /api/nope")
        );
        assert_eq!(
            index["invalid"].error.as_deref(),
            Some("Validation error: Invalid email address: bad")
        );
        assert!(index["slow"].error.as_deref().unwrap().starts_with("Timeout error:"));
        assert_eq!(
            index["gone"].error.as_deref(),
            Some("Not found: Lead unknown")
        );
        assert!(index["ok"].success);
        assert!(index.values().filter(|r| r.id != "ok").all(|r| !r.success && r.data.is_none()));
    }

    #[actix_web::test]
    async fn test_batch_rejects_duplicate_ids_without_running() {
        let fx = fixture();
        let app = app!(fx.state);

        let resp = test::call_service(
            &app,
            batch_request!(json!({
                "requests": [
                    {"id": "a", "method": "GET", "path": "/test/count"},
                    {"id": "a", "method": "GET", "path": "/test/count"}
                ]
            })),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.code, "VALIDATION_ERROR");
        assert!(body.error.message.contains("Duplicate request id: a"));
        assert_eq!(fx.hits.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn test_batch_payload_validation() {
        let fx = fixture();
        let app = app!(fx.state);

        let too_many: Vec<Value> = (0..9)
            .map(|i| json!({"id": i.to_string(), "method": "GET", "path": "/api/services"}))
            .collect();
        let rejected = [
            json!({"requests": []}),
            json!({"requests": too_many}),
            json!({"requests": [{"id": "", "method": "GET", "path": "/api/services"}]}),
        ];

        for payload in rejected {
            let resp = test::call_service(&app, batch_request!(payload.clone())).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
        }
    }

    #[actix_web::test]
    async fn test_bad_target_fails_only_its_own_result() {
        let fx = fixture();
        let app = app!(fx.state);

        let response: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({
                "requests": [
                    {"id": "relative", "method": "GET", "path": "api/services"},
                    {"id": "nested", "method": "POST", "path": "/api/batch", "body": {"requests": []}},
                    {"id": "nested_query", "method": "POST", "path": "/api/batch?x=1"},
                    {"id": "ok", "method": "GET", "path": "/api/services"}
                ]
            })),
        )
        .await;

        let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["relative", "nested", "nested_query", "ok"]);
        assert_eq!(
            response.results[0].error.as_deref(),
            Some("Bad request: Invalid path: api/services")
        );
        for nested in &response.results[1..3] {
            assert!(!nested.success);
            assert_eq!(
                nested.error.as_deref(),
                Some("Bad request: Nested batch requests are not allowed")
            );
        }
        assert!(response.results[3].success);
        assert_eq!(response.results[3].data.as_ref().map(|d| d.as_array().map(Vec::len)), Some(Some(3)));
    }

    #[actix_web::test]
    async fn test_batch_malformed_body_is_bad_request() {
        let fx = fixture();
        let app = app!(fx.state);

        let req = test::TestRequest::post()
            .uri("/api/batch")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"requests": [{"id": "a", "method": "TRACE", "path": "/"}]}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.code, "BAD_REQUEST");
    }

    #[actix_web::test]
    async fn test_sequential_mode_runs_in_request_order() {
        let fx = fixture();
        let app = app!(fx.state);

        let requests: Vec<Value> = (0..4)
            .map(|n| json!({"id": format!("r{}", n), "method": "GET", "path": format!("/test/order/{}", n)}))
            .collect();
        let response: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({"requests": requests, "options": {"parallel": false}})),
        )
        .await;

        assert!(response.results.iter().all(|r| r.success));
        assert_eq!(*fx.order.lock(), vec!["0", "1", "2", "3"]);
    }

    #[actix_web::test]
    async fn test_parallel_and_sequential_results_match() {
        let fx = fixture();
        let app = app!(fx.state);

        let requests = json!([
            {"id": "a", "method": "GET", "path": "/api/services"},
            {"id": "b", "method": "GET", "path": "/api/portfolio", "params": {"limit": 3}},
            {"id": "c", "method": "GET", "path": "/api/services/mentorship"},
            {"id": "d", "method": "GET", "path": "/api/nope"}
        ]);

        let parallel: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({"requests": requests, "options": {"parallel": true}})),
        )
        .await;
        let sequential: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({"requests": requests, "options": {"parallel": false}})),
        )
        .await;

        assert_eq!(parallel, sequential);
    }

    #[actix_web::test]
    async fn test_use_cache_shares_identical_gets() {
        let fx = fixture();
        let app = app!(fx.state);

        let requests = json!([
            {"id": "a", "method": "GET", "path": "/test/count"},
            {"id": "b", "method": "GET", "path": "/test/count"},
            {"id": "c", "method": "GET", "path": "/test/count", "params": {"page": 2}}
        ]);

        let cached: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({"requests": requests, "options": {"useCache": true}})),
        )
        .await;
        assert_eq!(fx.hits.load(Ordering::SeqCst), 2);
        assert_eq!(cached.results[0].data, cached.results[1].data);

        let _: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({"requests": requests, "options": {"useCache": false}})),
        )
        .await;
        assert_eq!(fx.hits.load(Ordering::SeqCst), 5);
    }

    #[actix_web::test]
    async fn test_use_cache_ignored_unless_sharing_enabled() {
        let fx = fixture();
        let mut config = fx.state.config().clone();
        config.batch = config.batch.clone().with_shared_gets(false);
        let state = AppState::with_routes(
            config,
            Arc::clone(&fx.state.catalog),
            fx.state.routes.as_ref().clone(),
        );
        let app = app!(state);

        let response: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({
                "requests": [
                    {"id": "a", "method": "GET", "path": "/test/count"},
                    {"id": "b", "method": "GET", "path": "/test/count"}
                ],
                "options": {"useCache": true}
            })),
        )
        .await;

        assert!(response.results.iter().all(|r| r.success));
        assert_eq!(fx.hits.load(Ordering::SeqCst), 2);
        assert_ne!(response.results[0].data, response.results[1].data);
    }

    #[actix_web::test]
    async fn test_use_cache_never_shares_writes() {
        let fx = fixture();
        let app = app!(fx.state);

        let response: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({
                "requests": [
                    {"id": "a", "method": "POST", "path": "/api/leads", "body": {"email": "a@b.com"}},
                    {"id": "b", "method": "POST", "path": "/api/leads", "body": {"email": "a@b.com"}}
                ],
                "options": {"useCache": true}
            })),
        )
        .await;

        assert!(response.results.iter().all(|r| r.success));
        assert_ne!(response.results[0].data, response.results[1].data);
        assert_eq!(fx.state.catalog.lead_count(), 2);
    }

    #[actix_web::test]
    async fn test_batch_matches_direct_response() {
        let fx = fixture();
        let app = app!(fx.state);

        for path in ["/api/services", "/api/services/career-coaching", "/api/portfolio?limit=2"] {
            let direct: Value = test::call_and_read_body_json(
                &app,
                test::TestRequest::get().uri(path).to_request(),
            )
            .await;
            let batched: BatchResponse = test::call_and_read_body_json(
                &app,
                batch_request!(json!({"requests": [{"id": "x", "method": "GET", "path": path}]})),
            )
            .await;
            assert_eq!(batched.results[0].data.as_ref(), Some(&direct), "path: {}", path);
        }
    }

    #[actix_web::test]
    async fn test_explicit_params_override_path_query() {
        let fx = fixture();
        let app = app!(fx.state);

        let response: BatchResponse = test::call_and_read_body_json(
            &app,
            batch_request!(json!({"requests": [
                {"id": "a", "method": "GET", "path": "/api/portfolio?limit=1", "params": {"limit": "3"}}
            ]})),
        )
        .await;
        assert_eq!(response.results[0].data.as_ref().unwrap().as_array().unwrap().len(), 3);
    }

    // ==================== Route Table ====================

    #[::core::prelude::v1::test]
    fn test_route_table_resolves_params_and_methods() {
        let catalog = Arc::new(CatalogStore::seeded());
        let table = routes::default_routes(&catalog);

        let (_, params) = table.resolve(HttpMethod::Get, "/api/leads/abc").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("abc"));
        assert!(table.resolve(HttpMethod::Delete, "/api/leads/abc").is_some());
        assert!(table.resolve(HttpMethod::Put, "/api/leads/abc").is_none());
        assert!(table.resolve(HttpMethod::Get, "/api/leads").is_none());
        assert!(table.resolve(HttpMethod::Get, "/api/services/a/b").is_none());
    }

    #[::core::prelude::v1::test]
    fn test_sub_request_json_errors() {
        let request = SubRequest::new(HttpMethod::Post, "/api/leads");
        let missing: Result<Value> = request.json();
        assert!(matches!(missing, Err(PortalError::BadRequest(_))));

        let request = request.with_body(json!({"email": 5}));
        let wrong: Result<crate::services::NewLead> = request.json();
        assert!(matches!(wrong, Err(PortalError::BadRequest(_))));
    }

    #[::core::prelude::v1::test]
    fn test_empty_route_table() {
        let table = RouteTable::new();
        assert!(table.is_empty());
        assert!(table.resolve(HttpMethod::Get, "/api/services").is_none());
    }
}
