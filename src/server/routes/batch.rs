//! Batch endpoint
//!
//! `POST /api/batch` executes a list of sub-requests against the route table
//! and answers 200 with one result per request, or 400 when the payload is
//! rejected as a whole.

use crate::core::batch::{BATCH_PATH, BatchRequestPayload};
use crate::server::state::AppState;
use crate::utils::error::{PortalError, Result};
use actix_web::{HttpResponse, web};
use tracing::info;

/// Configure batch routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(BATCH_PATH, web::post().to(execute_batch));
}

/// JSON extractor settings: body size limit and a standard 400 body on parse errors
pub fn json_config(max_body_size: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body_size)
        .error_handler(|err, _req| {
            PortalError::bad_request(format!("Invalid batch payload: {}", err)).into()
        })
}

pub async fn execute_batch(
    state: web::Data<AppState>,
    payload: web::Json<BatchRequestPayload>,
) -> Result<HttpResponse> {
    let payload = payload.into_inner();
    info!(
        requests = payload.requests.len(),
        parallel = payload.options.parallel,
        use_cache = payload.options.use_cache,
        "Batch received"
    );

    let response = state.executor.execute(payload).await?;
    Ok(HttpResponse::Ok().json(response))
}
