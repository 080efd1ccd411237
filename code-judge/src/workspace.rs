use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::Error;

/// Shared parent directory under which every execution gets its own workspace.
#[derive(Debug, Clone)]
pub struct ScratchRoot {
    root: PathBuf,
}

impl ScratchRoot {
    /// Use `root` as the scratch root, creating it if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            Error::Workspace(format!(
                "Failed to create scratch root {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh workspace, run `f` in it, then remove it.
    ///
    /// The directory is removed whatever `f` returns. If the returned future
    /// is dropped early or panics, the guard's `Drop` removes it instead.
    pub async fn with_workspace<F, Fut, T>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = T>,
    {
        let workspace = Workspace::create(&self.root).await?;
        let value = f(workspace.path().to_path_buf()).await;
        workspace.cleanup().await;
        Ok(value)
    }
}

/// A uniquely named directory owned by exactly one execution.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    removed: bool,
}

impl Workspace {
    async fn create(root: &Path) -> Result<Self, Error> {
        let dir = root.join(format!("exec-{}", Uuid::new_v4()));
        fs::create_dir(&dir).await.map_err(|e| {
            Error::Workspace(format!(
                "Failed to create workspace {}: {}",
                dir.display(),
                e
            ))
        })?;
        debug!("Allocated workspace {}", dir.display());
        Ok(Self {
            dir,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    async fn cleanup(mut self) {
        if let Err(e) = fs::remove_dir_all(&self.dir).await {
            error!(
                "Failed to clean up workspace {}: {}",
                self.dir.display(),
                e
            );
        } else {
            debug!("Removed workspace {}", self.dir.display());
        }
        self.removed = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            error!(
                "Failed to clean up workspace {}: {}",
                self.dir.display(),
                e
            );
        }
    }
}
