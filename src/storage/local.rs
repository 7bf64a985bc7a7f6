//! Local filesystem state store.
//!
//! Keeps `state.json` under a storage directory. Writes go to a temporary
//! file first and are renamed into place, so a reader never observes a
//! partially written record.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::WatchState;
use crate::storage::{StateRecord, StateStore};

const STATE_FILE: &str = "state.json";

/// Filesystem-backed state store.
#[derive(Clone)]
pub struct LocalStateStore {
    root_dir: PathBuf,
}

impl LocalStateStore {
    /// Create a new store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Full path of the state file.
    pub fn state_path(&self) -> PathBuf {
        self.root_dir.join(STATE_FILE)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, path: &PathBuf) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn load_state(&self) -> Result<WatchState> {
        let path = self.state_path();
        let Some(bytes) = self.read_bytes(&path).await? else {
            log::debug!("No state file at {}; first run.", path.display());
            return Ok(WatchState::default());
        };

        match serde_json::from_slice::<StateRecord>(&bytes) {
            Ok(record) => Ok(record.state),
            Err(e) => {
                log::warn!(
                    "State file {} is unparseable ({}); treating as no prior state.",
                    path.display(),
                    e
                );
                Ok(WatchState::default())
            }
        }
    }

    async fn save_state(&self, state: &WatchState) -> Result<()> {
        let record = StateRecord::new(state.clone());
        let bytes = serde_json::to_vec_pretty(&record)?;
        self.write_bytes(&self.state_path(), &bytes).await
    }
}
