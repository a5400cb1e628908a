use crate::core::KeyValueStore;
use crate::utils::error::{BookingError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CORRUPT: &str = "corrupt store";

/// Key/value store kept as one JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Read-modify-write of the whole file must not interleave.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self, key: &str) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) if data.is_empty() => Ok(BTreeMap::new()),
            Ok(data) => serde_json::from_slice(&data).map_err(|e| {
                let message = format!("{} {}: {}", CORRUPT, self.path.display(), e);
                BookingError::persistence(key, message)
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(BookingError::persistence(key, e)),
        }
    }

    /// Like `read_all`, but a corrupt file is replaced instead of blocking
    /// every later write.
    async fn read_for_update(&self, key: &str) -> Result<BTreeMap<String, String>> {
        match self.read_all(key).await {
            Err(BookingError::PersistenceError { message, .. }) if message.starts_with(CORRUPT) => {
                tracing::warn!(path = %self.path.display(), "overwriting {}", message);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    async fn write_all(&self, key: &str, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| BookingError::persistence(key, e))?;
            }
        }

        let data = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, data)
            .await
            .map_err(|e| BookingError::persistence(key, e))?;
        tracing::debug!(path = %self.path.display(), key, "store written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.read_all(key).await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_for_update(key).await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(key, &entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_for_update(key).await?;
        if entries.remove(key).is_some() {
            self.write_all(key, &entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BookingError::persistence("*", e)),
        }
    }
}
