//! OpenAPI documentation and schema generation
//!
//! The document is generated at compile time by utoipa from the handler
//! annotations in [`routes`](crate::api::routes).

use utoipa::OpenApi;

/// OpenAPI documentation for the clipfetch REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "clipfetch REST API",
        version = "0.1.0",
        description = "Submit media downloads, poll their progress, and fetch the finished files",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::submit_download,
        crate::api::routes::get_status,

        // Files
        crate::api::routes::download_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_capabilities,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::MediaFormat,
        crate::types::Quality,
        crate::types::JobRecord,
        crate::types::DownloadRequest,
        crate::types::SubmitResponse,
        crate::types::Capabilities,
        crate::types::FetcherCapabilitiesInfo,

        // API response types from routes
        crate::api::routes::HealthResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Download jobs - Submit a URL and poll its progress"),
        (name = "files", description = "Finished artifacts - Download the produced file"),
        (name = "system", description = "System endpoints - Health checks, capabilities, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
