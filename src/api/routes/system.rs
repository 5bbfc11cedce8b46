//! System handlers: health, capabilities, OpenAPI.

use super::HealthResponse;
use crate::api::AppState;
use crate::types::{Capabilities, FetcherCapabilitiesInfo};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        jobs: state.runner.store().len(),
        active_jobs: state.runner.active_jobs(),
        accepting: state.runner.is_accepting(),
    })
}

/// GET /api/capabilities - Query fetch engine capabilities
#[utoipa::path(
    get,
    path = "/api/capabilities",
    tag = "system",
    responses(
        (status = 200, description = "Current fetch engine capabilities", body = Capabilities)
    )
)]
pub async fn get_capabilities(State(state): State<AppState>) -> impl IntoResponse {
    let fetcher = state.runner.fetcher();
    let caps = fetcher.capabilities();
    let capabilities = Capabilities {
        fetcher: FetcherCapabilitiesInfo {
            can_fetch: caps.can_fetch,
            can_extract_audio: caps.can_extract_audio,
            engine: fetcher.name().to_string(),
        },
    };
    (StatusCode::OK, Json(capabilities))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
