//! REST API server module
//!
//! A small JSON API for submitting downloads, polling their progress and
//! fetching the finished files.

use crate::config::Config;
use crate::error::Result;
use crate::jobs::JobRunner;
use crate::storage::ArtifactStore;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs
/// - `POST /api/download` - Submit a download (`{url, format?, quality?}`)
/// - `GET /api/status/:id` - Poll one job
///
/// ## Files
/// - `GET /download/:filename` - Download a finished artifact
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /api/capabilities` - Fetch engine capabilities
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(runner: JobRunner, artifacts: ArtifactStore, config: Arc<Config>) -> Router {
    let state = AppState::new(runner, artifacts, config.clone());

    let router = Router::new()
        // Jobs
        .route("/api/download", post(routes::submit_download))
        .route("/api/status/:id", get(routes::get_status))
        // Files
        .route("/download/:filename", get(routes::download_file))
        // System
        .route("/health", get(routes::health_check))
        .route("/api/capabilities", get(routes::get_capabilities))
        .route("/openapi.json", get(routes::openapi_spec));

    // SwaggerUi serves its own copy of the document under a separate path
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Serves until `shutdown` resolves, then stops accepting connections and
/// lets in-flight requests finish.
///
/// # Example
///
/// ```no_run
/// use clipfetch::{Config, JobRunner, NoOpFetcher};
/// use clipfetch::storage::ArtifactStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let runner = JobRunner::new(config.clone(), Arc::new(NoOpFetcher));
/// let artifacts = ArtifactStore::new(config.download_dir())?;
///
/// clipfetch::api::start_api_server(runner, artifacts, config, async {
///     tokio::signal::ctrl_c().await.ok();
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(
    runner: JobRunner,
    artifacts: ArtifactStore,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(runner, artifacts, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
