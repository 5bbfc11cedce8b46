//! Artifact download handler.

use crate::api::AppState;
use crate::error::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// GET /download/:filename - Stream a finished artifact
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File name from a finished job's `file` field")
    ),
    responses(
        (status = 200, description = "Artifact bytes, sent as an attachment"),
        (status = 404, description = "No such artifact", body = ApiError)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let path = state.artifacts.resolve(&filename).await?;
    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();

    tracing::debug!(filename = %filename, bytes = length, "Serving artifact");

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        filename.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type_for(&filename)),
        ),
        (header::CONTENT_DISPOSITION, disposition),
        (header::CONTENT_LENGTH, HeaderValue::from(length)),
    ];

    Ok((
        StatusCode::OK,
        headers,
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// MIME type for an artifact, by extension
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("mov") => "video/quicktime",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("opus") | Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}
