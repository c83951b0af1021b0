//! File-based event listings.
//!
//! One JSON document per event under `{data_dir}/events/`.

use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::store::error::{StorageError, StorageResult};
use crate::store::{Event, EventStore};

use super::{load_json_dir, write_json_atomic};

/// File-backed implementation of [`EventStore`].
pub struct FileEventStore {
    dir: PathBuf,
    cache: DashMap<String, Event>,
    write_lock: Mutex<()>,
}

impl FileEventStore {
    /// Open the store, loading all event documents into the index.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        let cache = DashMap::new();
        for event in load_json_dir::<Event>(&dir).await? {
            cache.insert(event.id.clone(), event);
        }
        Ok(Self {
            dir,
            cache,
            write_lock: Mutex::new(()),
        })
    }

    async fn persist(&self, event: &Event) -> StorageResult<()> {
        write_json_atomic(&self.dir, &format!("{}.json", event.id), event).await
    }
}

#[async_trait]
impl EventStore for FileEventStore {
    async fn get(&self, id: &str) -> StorageResult<Option<Event>> {
        Ok(self.cache.get(id).map(|e| e.clone()))
    }

    async fn list(&self) -> StorageResult<Vec<Event>> {
        Ok(self.cache.iter().map(|e| e.clone()).collect())
    }

    async fn create(&self, event: Event) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(&event).await?;
        self.cache.insert(event.id.clone(), event);
        Ok(())
    }

    async fn update(&self, event: Event) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        if !self.cache.contains_key(&event.id) {
            return Err(StorageError::not_found("event", &event.id));
        }
        self.persist(&event).await?;
        self.cache.insert(event.id.clone(), event);
        Ok(())
    }
}
