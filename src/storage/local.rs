//! Local filesystem history store.
//!
//! Keeps the history as a pretty-printed JSON array under
//! `{root}/{file_name}`. Writes go to a temp file first and are renamed into
//! place, and a mutex serialises read-modify-write cycles within the
//! process.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{HistoryConfig, HistoryRecord, push_history};
use crate::storage::HistoryStore;

/// Local filesystem history backend.
pub struct LocalHistoryStore {
    root_dir: PathBuf,
    file_name: String,
    capacity: usize,
    lock: Mutex<()>,
}

impl LocalHistoryStore {
    /// Create a store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, config: &HistoryConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            file_name: config.file_name.clone(),
            capacity: config.capacity,
            lock: Mutex::new(()),
        }
    }

    /// Full path of the history file.
    pub fn path(&self) -> PathBuf {
        self.root_dir.join(&self.file_name)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read the history file; a missing file is an empty history.
    async fn read_history(&self) -> Result<Vec<HistoryRecord>> {
        match tokio::fs::read(self.path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn write_history(&self, history: &[HistoryRecord]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(history)?;
        self.write_bytes(&bytes).await
    }
}

#[async_trait]
impl HistoryStore for LocalHistoryStore {
    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        let _guard = self.lock.lock().await;
        self.read_history().await
    }

    async fn record(&self, entry: HistoryRecord) -> Result<Vec<HistoryRecord>> {
        let _guard = self.lock.lock().await;

        let mut history = self.read_history().await.unwrap_or_else(|e| {
            log::warn!("History file unreadable, starting fresh: {}", e);
            Vec::new()
        });
        push_history(&mut history, entry, self.capacity);
        self.write_history(&history).await?;

        log::debug!("History now holds {} entries", history.len());
        Ok(history)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(self.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
