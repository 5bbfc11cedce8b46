//! # clipfetch
//!
//! Media download job tracker with a small REST API around yt-dlp.
//!
//! A client submits a media page URL, gets a job id back immediately, polls
//! the job's progress, and downloads the finished file once the job reports
//! `finished`.
//!
//! ## Components
//!
//! - [`jobs::JobStore`] - shared table of job records
//! - [`jobs::ProgressReporter`] - turns engine progress into record updates
//! - [`jobs::JobRunner`] - runs each job on its own task, a few at a time
//! - [`fetcher::MediaFetcher`] - the external engine ([`YtDlpFetcher`] or a stub)
//! - [`storage::ArtifactStore`] - serves finished files without path traversal
//! - [`api`] - axum router and server
//!
//! ## Quick Start
//!
//! ```no_run
//! use clipfetch::{Config, JobRunner, fetcher::fetcher_from_config, storage::ArtifactStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let fetcher = fetcher_from_config(&config.tools);
//!     let runner = JobRunner::new(config.clone(), fetcher);
//!     let artifacts = ArtifactStore::new(config.download_dir())?;
//!
//!     clipfetch::api::start_api_server(runner.clone(), artifacts, config, async {
//!         tokio::signal::ctrl_c().await.ok();
//!     })
//!     .await?;
//!     runner.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Media fetch engines
pub mod fetcher;
/// Job tracking and execution
pub mod jobs;
/// Artifact directory access
pub mod storage;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, FetchError, Result, ToHttpStatus};
pub use fetcher::{
    ArtifactInfo, FetchRequest, FetcherCapabilities, MediaFetcher, NoOpFetcher, ProgressEvent,
    ProgressPhase, ProgressSink, YtDlpFetcher,
};
pub use jobs::{JobRunner, JobStore, ProgressReporter};
pub use storage::ArtifactStore;
pub use types::{
    Capabilities, DownloadRequest, JobId, JobRecord, JobStatus, MediaFormat, Quality,
    SubmitResponse,
};

use std::sync::Arc;

/// Serve the API until a termination signal, then drain running jobs.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use clipfetch::{ArtifactStore, Config, JobRunner, NoOpFetcher, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::default());
///     let artifacts = ArtifactStore::new(config.download_dir())?;
///     let runner = JobRunner::new(config.clone(), Arc::new(NoOpFetcher));
///     run_with_shutdown(runner, artifacts, config).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(
    runner: JobRunner,
    artifacts: ArtifactStore,
    config: Arc<Config>,
) -> Result<()> {
    serve_until(runner, artifacts, config, wait_for_signal()).await
}

/// Serve the API until `shutdown` resolves, then drain running jobs
///
/// The server stops taking connections first. [`JobRunner::shutdown`] then
/// waits for in-flight jobs for up to `download.shutdown_timeout`.
pub async fn serve_until<F>(
    runner: JobRunner,
    artifacts: ArtifactStore,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    api::start_api_server(runner.clone(), artifacts, config, shutdown).await?;
    runner.shutdown().await
}

/// Resolves once SIGTERM or SIGINT (Ctrl+C elsewhere) is received
pub async fn wait_for_signal() {
    wait_for_signal_impl().await
}

#[cfg(unix)]
async fn wait_for_signal_impl() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal_impl() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn setup() -> (tempfile::TempDir, JobRunner, ArtifactStore, Arc<Config>) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.download.download_dir = dir.path().join("downloads");
        config.download.shutdown_timeout = Duration::from_secs(5);
        config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
        config.fetch.cookie_file = None;
        let config = Arc::new(config);

        let artifacts = ArtifactStore::new(config.download_dir()).unwrap();
        let runner = JobRunner::new(config.clone(), Arc::new(NoOpFetcher));
        (dir, runner, artifacts, config)
    }

    #[tokio::test]
    async fn serve_until_drains_jobs_after_shutdown_signal() {
        let (_dir, runner, artifacts, config) = setup();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(runner.clone(), artifacts, config, async {
            rx.await.ok();
        }));

        let id = runner
            .submit(DownloadRequest::new(
                "https://example.com/watch?v=abc",
                MediaFormat::Video,
                Quality::Hd,
            ))
            .unwrap();
        tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(10), server)
            .await
            .expect("server should stop after the signal")
            .unwrap()
            .unwrap();

        assert!(!runner.is_accepting());
        assert_eq!(runner.active_jobs(), 0);
        assert_eq!(runner.status(id).unwrap().status, JobStatus::Errored);
        assert!(matches!(
            runner.submit(DownloadRequest::new(
                "https://example.com/b",
                MediaFormat::Audio,
                Quality::Best,
            )),
            Err(Error::ShuttingDown)
        ));
    }
}
