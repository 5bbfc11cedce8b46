//! Artifact directory access
//!
//! Finished artifacts live flat in one directory. Names coming from HTTP
//! requests are resolved here, and anything that could point outside that
//! directory is answered with "not found".

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// The directory finished artifacts are written to and served from
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open the artifact directory, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created or resolved.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        tracing::debug!(root = %root.display(), "Artifact directory ready");
        Ok(Self { root })
    }

    /// Canonical path of the artifact directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied file name to a servable file
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the name is empty, contains a path
    /// separator or `..`, is absolute, does not name a regular file, or
    /// resolves (through symlinks) outside the artifact directory.
    pub async fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let not_found = || Error::NotFound(format!("file {filename}"));

        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename.contains("..")
            || !is_single_normal_component(filename)
        {
            tracing::debug!(filename, "Rejected artifact name");
            return Err(not_found());
        }

        let candidate = self.root.join(filename);
        let resolved = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|_| not_found())?;
        if !resolved.starts_with(&self.root) {
            tracing::warn!(filename, resolved = %resolved.display(), "Artifact escapes download directory");
            return Err(not_found());
        }

        let metadata = tokio::fs::metadata(&resolved)
            .await
            .map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok(resolved)
    }
}

fn is_single_normal_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
