use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::error::AppError;

/// Append-only collection persisted as a pretty-printed JSON array.
///
/// The whole array is rewritten on every append. Entries keep insertion
/// order, which is the only ordering callers may rely on.
pub struct JsonLog<T> {
    path: PathBuf,
    entries: Mutex<Vec<T>>,
}

impl<T> JsonLog<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Opens the log at `path`, creating its parent directory. A missing file
    /// is an empty log; an unreadable or corrupt one is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let entries = match async_fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                let json = async_fs::read_to_string(&path).await?;
                if json.trim().is_empty() {
                    Vec::new()
                } else {
                    serde_json::from_str(&json)?
                }
            }
            Ok(_) => {
                return Err(AppError::Storage(format!(
                    "{} is not a regular file",
                    path.display()
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `entry` and persists. On a failed write the entry is dropped
    /// again so memory and disk stay in step.
    pub async fn append(&self, entry: T) -> Result<(), AppError> {
        let mut entries = self.entries.lock().await;
        entries.push(entry);
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Last `limit` entries, newest first.
    pub async fn newest(&self, limit: usize) -> Vec<T> {
        let entries = self.entries.lock().await;
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub async fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let entries = self.entries.lock().await;
        entries.iter().find(|e| predicate(e)).cloned()
    }

    /// Appends `entry` unless `conflicts` matches an existing entry. Returns
    /// whether the entry was stored.
    pub async fn append_unless<F>(&self, entry: T, conflicts: F) -> Result<bool, AppError>
    where
        F: Fn(&T) -> bool,
    {
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|e| conflicts(e)) {
            return Ok(false);
        }
        entries.push(entry);
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }
        Ok(true)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, entries: &[T]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
