//! Test fixtures: configuration and a step-by-step fetcher

use async_trait::async_trait;
use clipfetch::{
    ArtifactInfo, Config, FetchError, FetchRequest, FetcherCapabilities, MediaFetcher,
    ProgressEvent, ProgressSink,
};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Configuration rooted in a fresh temporary directory
pub fn test_config() -> (Config, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::default();
    config.download.download_dir = dir.path().join("downloads");
    config.download.shutdown_timeout = Duration::from_secs(5);
    config.fetch.cookie_file = None;
    (config, dir)
}

/// One thing a [`SteppedFetcher`] does
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver this progress event
    Progress(ProgressEvent),
    /// Write the artifact (named after the output template) and succeed
    Succeed {
        /// Extension the engine "produced"
        extension: &'static str,
        /// Title to report
        title: Option<String>,
        /// Whether streams were merged
        merged: bool,
    },
    /// Succeed with a path that cannot be served
    SucceedWithPath(PathBuf),
    /// Fail with this engine message
    Fail(String),
}

/// Fetcher that performs scripted steps, one per [`advance`](Self::advance)
///
/// Lets a test observe the job record between any two progress events.
pub struct SteppedFetcher {
    steps: Mutex<Vec<Step>>,
    gate: Semaphore,
}

impl SteppedFetcher {
    /// Fetcher that will perform `steps` in order
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps),
            gate: Semaphore::new(0),
        }
    }

    /// Allow the next `n` steps to run
    pub fn advance(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Allow every remaining step to run
    pub fn release_all(&self) {
        self.gate.add_permits(1_000);
    }

    /// Wait until every step allowed so far has run
    ///
    /// Exact on the single-threaded test runtime, where a step runs to its
    /// next await point as soon as it takes its permit.
    pub async fn settle(&self) {
        while self.gate.available_permits() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl MediaFetcher for SteppedFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn ProgressSink,
    ) -> Result<ArtifactInfo, FetchError> {
        let steps: Vec<Step> = std::mem::take(&mut *self.steps.lock().expect("steps lock"));

        for step in steps {
            self.gate
                .acquire()
                .await
                .expect("gate never closes")
                .forget();

            match step {
                Step::Progress(event) => progress.report(event),
                Step::Succeed {
                    extension,
                    title,
                    merged,
                } => {
                    let path = PathBuf::from(
                        request
                            .output_template
                            .to_string_lossy()
                            .replace("%(ext)s", extension),
                    );
                    tokio::fs::write(&path, b"artifact").await?;
                    return Ok(ArtifactInfo {
                        path,
                        title,
                        merged,
                    });
                }
                Step::SucceedWithPath(path) => {
                    return Ok(ArtifactInfo {
                        path,
                        title: None,
                        merged: false,
                    });
                }
                Step::Fail(message) => {
                    return Err(FetchError::Engine {
                        message,
                        exit_code: Some(1),
                    });
                }
            }
        }

        Err(FetchError::MissingOutput)
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: true,
            can_extract_audio: true,
        }
    }

    fn name(&self) -> &'static str {
        "stepped"
    }
}
