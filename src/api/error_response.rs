//! HTTP error response handling for the API
//!
//! Domain errors become a status code plus the JSON error envelope.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Implement IntoResponse for Error to automatically convert errors to HTTP responses
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Implement IntoResponse for ApiError for explicit error responses
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // A bare ApiError carries no status of its own
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn not_found_into_response() {
        let response = Error::NotFound("job 123".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "not_found");
        assert_eq!(api_error.error.details.unwrap()["resource"], "job 123");
    }

    #[tokio::test]
    async fn invalid_request_into_response() {
        let response = Error::InvalidRequest("url is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await.error.code, "invalid_request");
    }

    #[tokio::test]
    async fn shutting_down_into_response() {
        let response = Error::ShuttingDown.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_of(response).await.error.code, "shutting_down");
    }

    #[tokio::test]
    async fn io_error_into_response() {
        let response =
            Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.error.code, "io_error");
    }

    #[tokio::test]
    async fn bare_api_error_is_internal() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.error.code, "internal_error");
    }
}
