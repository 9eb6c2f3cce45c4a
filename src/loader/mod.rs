// Loader module: price sheet parsing and snapshot management.

pub mod sheet;

pub use sheet::SheetLoader;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::model::{Dataset, LoaderError};

#[async_trait::async_trait]
pub trait DatasetLoader: Send + Sync {
    async fn load(&self) -> Result<Dataset, LoaderError>;
}

/// Holds the current dataset snapshot. A reload swaps in a whole new
/// `Arc<Dataset>`; queries keep whatever snapshot they started with, so a
/// half-read sheet is never observable.
pub struct DatasetCache<L: DatasetLoader> {
    loader: L,
    path: PathBuf,
    modified: Option<SystemTime>,
    snapshot: Arc<Dataset>,
}

impl<L: DatasetLoader> DatasetCache<L> {
    pub async fn open(loader: L, path: impl Into<PathBuf>) -> Result<Self, LoaderError> {
        let path = path.into();
        let snapshot = Arc::new(loader.load().await?);
        let modified = sheet_mtime(&path);
        Ok(Self {
            loader,
            path,
            modified,
            snapshot,
        })
    }

    pub fn current(&self) -> Arc<Dataset> {
        self.snapshot.clone()
    }

    /// Reloads unconditionally and swaps the snapshot.
    pub async fn refresh(&mut self) -> Result<Arc<Dataset>, LoaderError> {
        let dataset = self.loader.load().await?;
        self.modified = sheet_mtime(&self.path);
        self.snapshot = Arc::new(dataset);
        Ok(self.snapshot.clone())
    }

    /// Reloads only when the sheet's modification time moved since the last
    /// load. Returns whether a new snapshot was swapped in.
    pub async fn refresh_if_stale(&mut self) -> Result<bool, LoaderError> {
        if sheet_mtime(&self.path) == self.modified {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }
}

fn sheet_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok().and_then(|m| m.modified().ok())
}
