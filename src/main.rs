//! clipfetch server binary
//!
//! Configuration is read from the JSON file named by `CLIPFETCH_CONFIG` or
//! the first argument; without either, defaults apply. Log verbosity follows
//! `RUST_LOG`.

use clipfetch::fetcher::fetcher_from_config;
use clipfetch::{ArtifactStore, Config, JobRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipfetch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(load_config()?);
    tracing::info!(
        download_dir = %config.download_dir().display(),
        max_concurrent_jobs = config.download.max_concurrent_jobs,
        "Configuration loaded"
    );

    let artifacts = ArtifactStore::new(config.download_dir())?;
    let fetcher = fetcher_from_config(&config.tools);
    let runner = JobRunner::new(config.clone(), fetcher);

    clipfetch::run_with_shutdown(runner, artifacts, config).await?;
    Ok(())
}

fn load_config() -> clipfetch::Result<Config> {
    let path = std::env::var_os("CLIPFETCH_CONFIG")
        .map(PathBuf::from)
        .or_else(|| std::env::args_os().nth(1).map(PathBuf::from));

    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration file");
            Config::from_json_file(&path)
        }
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}
