//! Job execution: submission, the per-job task, and shutdown

use super::reporter::ProgressReporter;
use super::store::JobStore;
use crate::config::Config;
use crate::error::{Error, FetchError, Result};
use crate::fetcher::{ArtifactInfo, FetchRequest, MediaFetcher, Selection};
use crate::types::{DownloadRequest, JobId, JobRecord, MediaFormat, Quality};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

/// Title recorded when the engine does not report one
pub const FALLBACK_TITLE: &str = "Video";

/// Accepts download requests and runs each one on its own task
///
/// At most `max_concurrent_jobs` fetches run at once; later submissions stay
/// `pending` until a slot frees up. Submitting never waits for the fetch.
///
/// Cloning is cheap and clones share the store, the fetcher and the task pool.
#[derive(Clone)]
pub struct JobRunner {
    store: JobStore,
    fetcher: Arc<dyn MediaFetcher>,
    config: Arc<Config>,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    accepting: Arc<AtomicBool>,
}

impl JobRunner {
    /// Create a runner with an empty job store
    pub fn new(config: Arc<Config>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self::with_store(config, fetcher, JobStore::new())
    }

    /// Create a runner writing into an existing store
    pub fn with_store(config: Arc<Config>, fetcher: Arc<dyn MediaFetcher>, store: JobStore) -> Self {
        let permits = Arc::new(Semaphore::new(config.download.max_concurrent_jobs.max(1)));
        Self {
            store,
            fetcher,
            config,
            permits,
            tracker: TaskTracker::new(),
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Job store this runner writes to
    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Fetch engine in use
    pub fn fetcher(&self) -> &Arc<dyn MediaFetcher> {
        &self.fetcher
    }

    /// Configuration in use
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Snapshot of one job
    pub fn status(&self, id: JobId) -> Result<JobRecord> {
        self.store.get(id)
    }

    /// Whether new submissions are accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Number of jobs whose task has not returned yet
    pub fn active_jobs(&self) -> usize {
        self.tracker.len()
    }

    /// Accept a download request and start it in the background
    ///
    /// Returns the new job's id immediately. Missing `format`/`quality` take
    /// the configured defaults.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if the url is absent or blank
    /// - [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has begun
    pub fn submit(&self, request: DownloadRequest) -> Result<JobId> {
        if !self.is_accepting() {
            return Err(Error::ShuttingDown);
        }

        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::InvalidRequest("url is required".into()))?
            .to_string();
        let format = request.format.unwrap_or(self.config.download.default_format);
        let quality = request
            .quality
            .unwrap_or(self.config.download.default_quality);

        let id = self.store.create(format, quality);
        let fetch_request = self.fetch_request(id, url, format, quality);

        tracing::info!(
            job_id = %id,
            url = %fetch_request.url,
            format = format.as_str(),
            quality = quality.as_str(),
            "Job submitted"
        );

        let runner = self.clone();
        self.tracker.spawn(async move {
            runner.run_job(id, fetch_request).await;
        });

        Ok(id)
    }

    /// Stop accepting submissions and wait for running jobs
    ///
    /// Waits at most `download.shutdown_timeout`. Jobs still running after
    /// that are abandoned; their engine processes are killed when the
    /// runtime drops them.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting.store(false, Ordering::SeqCst);
        self.tracker.close();
        tracing::info!(active_jobs = self.tracker.len(), "Stopped accepting new jobs");

        let timeout = self.config.download.shutdown_timeout;
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => tracing::info!("All active jobs completed"),
            Err(_) => tracing::warn!(
                active_jobs = self.tracker.len(),
                timeout_secs = timeout.as_secs(),
                "Timeout waiting for jobs to complete, proceeding with shutdown"
            ),
        }

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    fn fetch_request(
        &self,
        id: JobId,
        url: String,
        format: MediaFormat,
        quality: Quality,
    ) -> FetchRequest {
        let fetch = &self.config.fetch;
        FetchRequest {
            url,
            format,
            quality,
            output_template: self.config.download_dir().join(format!("{id}.%(ext)s")),
            selection: Selection::for_request(format, quality, fetch),
            cookie_file: fetch.existing_cookie_file().map(Path::to_path_buf),
            http_headers: fetch.http_headers.clone(),
            extractor_args: fetch.extractor_args.clone(),
        }
    }

    async fn run_job(&self, id: JobId, request: FetchRequest) {
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::error!(job_id = %id, "Job slots closed before the job could start");
                self.store
                    .update(id, |record| record.mark_errored("job runner closed".into()));
                return;
            }
        };

        self.store.update(id, JobRecord::mark_downloading);
        tracing::debug!(job_id = %id, fetcher = self.fetcher.name(), "Fetch started");

        let reporter = ProgressReporter::new(self.store.clone(), id);
        let outcome = self
            .fetcher
            .fetch(&request, &reporter)
            .await
            .and_then(|artifact| {
                let file = artifact_file_name(&artifact, &request.selection)?;
                Ok((file, artifact.title))
            });

        match outcome {
            Ok((file, title)) => {
                let title = title
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_TITLE.to_string());
                tracing::info!(job_id = %id, file = %file, title = %title, "Job finished");
                self.store
                    .update(id, |record| record.mark_finished(file, title));
            }
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Job failed");
                self.store
                    .update(id, |record| record.mark_errored(e.to_string()));
            }
        }
    }
}

/// File name under which a finished artifact is served
///
/// Keeps only the final path component. When post-processing fixes the
/// container (audio extraction, or a merge that actually happened) the
/// extension is forced to match it.
///
/// # Errors
///
/// [`FetchError::InvalidOutput`] if the name is empty, `.`/`..`, not UTF-8,
/// or contains a path separator.
pub fn artifact_file_name(
    artifact: &ArtifactInfo,
    selection: &Selection,
) -> std::result::Result<String, FetchError> {
    let invalid = || FetchError::InvalidOutput(artifact.path.display().to_string());

    let base = artifact
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(invalid)?;

    let name = match selection.forced_extension(artifact.merged) {
        Some(ext) => Path::new(base)
            .with_extension(ext)
            .into_os_string()
            .into_string()
            .map_err(|_| invalid())?,
        None => base.to_string(),
    };

    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(invalid());
    }
    Ok(name)
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("fetcher", &self.fetcher.name())
            .field("jobs", &self.store.len())
            .field("active_jobs", &self.tracker.len())
            .field("accepting", &self.is_accepting())
            .finish()
    }
}
