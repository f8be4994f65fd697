//! JSON-file-backed document store.
//!
//! Wraps a [`MemoryStore`] and writes every collection to one JSON file.
//! A write reaches memory and listeners only after the file is written, so a
//! failed save leaves no trace. Listeners only live as long as the process.

use super::memory::Collections;
use super::{DocumentStore, ListenerId, MemoryStore, SnapshotSink, StoreError};
use async_trait::async_trait;
use city_types::Fields;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Document store persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    /// Serializes stage, persist and commit.
    writes: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let collections = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str::<Collections>(&contents)
                .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No store file at {}, starting empty", path.display());
                Collections::new()
            }
            Err(e) => return Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        };

        Ok(Self {
            path,
            memory: MemoryStore::from_collections(collections),
            writes: Arc::new(Mutex::new(())),
        })
    }

    /// The in-memory view the file mirrors.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    async fn persist(&self, collections: &Collections) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(collections)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!("Persisted store to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn listen(
        &self,
        collection: &str,
        sink: SnapshotSink,
    ) -> Result<ListenerId, StoreError> {
        self.memory.listen(collection, sink).await
    }

    fn remove_listener(&self, listener: ListenerId) {
        self.memory.remove_listener(listener);
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let _writes = self.writes.lock().await;
        let (id, staged) = self.memory.stage_add(collection, fields)?;
        self.persist(&staged).await?;
        self.memory.commit(collection, staged);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let _writes = self.writes.lock().await;
        let staged = self.memory.stage_set(collection, id, fields)?;
        self.persist(&staged).await?;
        self.memory.commit(collection, staged);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let _writes = self.writes.lock().await;
        let staged = self.memory.stage_delete(collection, id)?;
        self.persist(&staged).await?;
        self.memory.commit(collection, staged);
        Ok(())
    }
}
