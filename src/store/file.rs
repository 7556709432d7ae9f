use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use log::warn;
use tokio::sync::Mutex;

use super::{ ProfileStore, StoreError };

/// Profile store backed by a single JSON object on disk. Every mutation
/// rewrites the file; the map is small enough that this never matters.
pub struct FileProfileStore {
    path: PathBuf,
    entries: Mutex<Option<HashMap<String, String>>>,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(StoreError::Read(err)),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw).map_err(StoreError::Write)
    }

    async fn with_entries<T>(
        &self,
        apply: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<(T, HashMap<String, String>), StoreError> {
        let mut guard = self.entries.lock().await;
        let mut entries = match guard.take() {
            Some(entries) => entries,
            None => self.load()?,
        };
        let out = apply(&mut entries);
        let snapshot = entries.clone();
        *guard = Some(entries);
        Ok((out, snapshot))
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let (value, _) = self.with_entries(|entries| entries.get(key).cloned()).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (_, entries) = self
            .with_entries(|entries| {
                entries.insert(key.to_string(), value.to_string());
            })
            .await?;
        self.persist(&entries)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let (existed, entries) = self
            .with_entries(|entries| entries.remove(key).is_some())
            .await?;
        if existed {
            self.persist(&entries)?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let (_, entries) = self.with_entries(HashMap::clear).await?;
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("could not remove profile store file: {}", err);
                self.persist(&entries)?;
            }
        }
        Ok(())
    }
}
