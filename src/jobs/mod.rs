//! Job tracking and execution
//!
//! - [`JobStore`]: the shared table of job records
//! - [`ProgressReporter`]: turns engine progress into record updates
//! - [`JobRunner`]: accepts requests and drives each job to a terminal state

mod reporter;
mod runner;
mod store;

pub use reporter::{ProgressReporter, parse_percent};
pub use runner::{FALLBACK_TITLE, JobRunner, artifact_file_name};
pub use store::JobStore;
