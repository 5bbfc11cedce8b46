use super::*;
use crate::error::{ApiError, FetchError};
use crate::fetcher::{
    ArtifactInfo, FetchRequest, FetcherCapabilities, MediaFetcher, NoOpFetcher, ProgressEvent,
    ProgressSink,
};
use crate::types::{JobRecord, JobStatus};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// Fetcher that writes a small file next to the output template
///
/// Urls starting with `fail:` fail with the rest of the url as message.
struct FileWritingFetcher;

#[async_trait]
impl MediaFetcher for FileWritingFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<ArtifactInfo, FetchError> {
        if let Some(message) = request.url.strip_prefix("fail:") {
            return Err(FetchError::Engine {
                message: message.to_string(),
                exit_code: Some(1),
            });
        }

        progress.report(ProgressEvent::downloading(" 42.0%"));
        let path = std::path::PathBuf::from(
            request
                .output_template
                .to_string_lossy()
                .replace("%(ext)s", "mp4"),
        );
        tokio::fs::write(&path, b"fake video bytes").await?;
        progress.report(ProgressEvent::finished());

        Ok(ArtifactInfo {
            path,
            title: Some("Test Clip".into()),
            merged: true,
        })
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: true,
            can_extract_audio: false,
        }
    }

    fn name(&self) -> &'static str {
        "file-writing"
    }
}

struct TestApp {
    router: Router,
    runner: JobRunner,
    artifacts: ArtifactStore,
    _dir: TempDir,
}

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.download_dir = dir.path().join("downloads");
    config.download.shutdown_timeout = Duration::from_secs(5);
    config.fetch.cookie_file = None;
    config
}

fn app_with(fetcher: Arc<dyn MediaFetcher>, configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    configure(&mut config);
    let config = Arc::new(config);

    let artifacts = ArtifactStore::new(config.download_dir()).unwrap();
    let runner = JobRunner::new(config.clone(), fetcher);
    let router = create_router(runner.clone(), artifacts.clone(), config);

    TestApp {
        router,
        runner,
        artifacts,
        _dir: dir,
    }
}

fn test_app() -> TestApp {
    app_with(Arc::new(FileWritingFetcher), |_| {})
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, body)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn submit(router: &Router, body: Value) -> String {
    let (status, json) = post_json(router, "/api/download", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK, "submit failed: {json}");
    json["id"].as_str().unwrap().to_string()
}

async fn poll_until_terminal(router: &Router, id: &str) -> Value {
    for _ in 0..500 {
        let (status, json) = get_json(router, &format!("/api/status/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        if json["status"] == "finished" || json["status"] == "error" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} never reached a terminal state");
}

#[tokio::test]
async fn test_api_server_spawns_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let artifacts = ArtifactStore::new(config.download_dir()).unwrap();
    let runner = JobRunner::new(config.clone(), Arc::new(NoOpFetcher));
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(start_api_server(runner, artifacts, config, async move {
        stop_rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = test_app();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let app = app_with(Arc::new(NoOpFetcher), |config| {
        config.server.api.cors_enabled = false;
    });

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app.router, request).await;

    assert!(headers.get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let app = app_with(Arc::new(NoOpFetcher), |config| {
        config.server.api.cors_origins = vec!["http://app.example".to_string()];
    });

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://app.example")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app.router, request).await;

    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://app.example")
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let enabled = test_app();
    let request = Request::builder()
        .uri("/swagger-ui/")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&enabled.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let disabled = app_with(Arc::new(NoOpFetcher), |config| {
        config.server.api.swagger_ui = false;
    });
    let request = Request::builder()
        .uri("/swagger-ui/")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&disabled.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
