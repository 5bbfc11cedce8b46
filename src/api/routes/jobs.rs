//! Job submission and status handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::types::{DownloadRequest, JobId, SubmitResponse};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /api/download - Submit a download job
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "jobs",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Job accepted", body = SubmitResponse),
        (status = 400, description = "Missing url or malformed body", body = ApiError),
        (status = 503, description = "Server is shutting down", body = ApiError)
    )
)]
pub async fn submit_download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected download request body");
            return Error::InvalidRequest(rejection.body_text()).into_response();
        }
    };

    match state.runner.submit(request) {
        Ok(id) => (StatusCode::OK, Json(SubmitResponse { id })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Download request rejected");
            e.into_response()
        }
    }
}

/// GET /api/status/:id - Poll one job
#[utoipa::path(
    get,
    path = "/api/status/{id}",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID returned by POST /api/download")
    ),
    responses(
        (status = 200, description = "Current job snapshot", body = JobRecord),
        (status = 404, description = "Unknown job", body = ApiError)
    )
)]
pub async fn get_status(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    // An id that is not even a UUID cannot name a job
    let Ok(job_id) = id.parse::<JobId>() else {
        return Error::NotFound(format!("job {id}")).into_response();
    };

    match state.runner.status(job_id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}
