//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`]: submitting downloads and polling their status
//! - [`files`]: serving finished artifacts
//! - [`system`]: health, capabilities, OpenAPI

use serde::{Deserialize, Serialize};

mod files;
mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use files::*;
pub use jobs::*;
pub use system::*;

/// Response body for GET /health
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Jobs submitted since start
    pub jobs: usize,
    /// Jobs whose task is still running or waiting for a slot
    pub active_jobs: usize,
    /// Whether new submissions are accepted
    pub accepting: bool,
}
