use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

const WORKSPACE_PREFIX: &str = "mix-identify-";

/// Private scratch directory holding one run's cut and chunk files
///
/// Every workspace gets a fresh, uniquely named directory. It is removed by
/// [`Workspace::close`] or, if never closed, when dropped. Removal failures are
/// logged and never returned.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a new workspace under `root`, or the system temp dir when `None`
    pub fn create(root: Option<&Path>) -> PipelineResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| {
                    PipelineError::workspace(
                        format!("Failed to create workspace root {}", root.display()),
                        e,
                    )
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| PipelineError::workspace("Failed to create workspace directory", e))?;

        let path = dir.path().to_path_buf();
        debug!(workspace = %path.display(), "Workspace created");

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of an entry inside the workspace
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the workspace on the blocking pool.
    ///
    /// Long windows leave thousands of chunk files behind, so removal stays off
    /// the async worker threads.
    pub async fn close(mut self) {
        if let Some(dir) = self.dir.take() {
            let path = self.path.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || remove(dir)).await {
                warn!(
                    workspace = %path.display(),
                    error = %e,
                    "Workspace removal task failed"
                );
            }
        }
    }
}

// Fallback for early returns and panics; removes synchronously
impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            remove(dir);
        }
    }
}

fn remove(dir: TempDir) {
    let path = dir.path().to_path_buf();
    match dir.close() {
        Ok(()) => debug!(workspace = %path.display(), "Workspace removed"),
        Err(e) => warn!(
            workspace = %path.display(),
            error = %e,
            "Failed to remove workspace"
        ),
    }
}
