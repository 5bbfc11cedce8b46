//! Application state for the API server

use crate::config::Config;
use crate::jobs::JobRunner;
use crate::storage::ArtifactStore;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; every field is a cheap handle.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Job runner (owns the job store and fetch engine)
    pub runner: JobRunner,

    /// Directory finished artifacts are served from
    pub artifacts: ArtifactStore,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(runner: JobRunner, artifacts: ArtifactStore, config: Arc<Config>) -> Self {
        Self {
            runner,
            artifacts,
            config,
        }
    }
}
