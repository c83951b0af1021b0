//! File-based user directory.
//!
//! One JSON document per user under `{data_dir}/users/`.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::store::error::{StorageError, StorageResult};
use crate::store::{User, UserStore};

use super::{load_json_dir, write_json_atomic};

/// Compare two tokens without leaking length or prefix timing.
fn tokens_match(a: &str, b: &str) -> bool {
    Sha256::digest(a.as_bytes()) == Sha256::digest(b.as_bytes())
}

/// File-backed implementation of [`UserStore`].
pub struct FileUserStore {
    dir: PathBuf,
    cache: DashMap<String, User>,
    /// Serializes mutations so a persist never races a newer in-memory state.
    write_lock: Mutex<()>,
}

impl FileUserStore {
    /// Open the store, loading all user documents into the index.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        let cache = DashMap::new();
        for user in load_json_dir::<User>(&dir).await? {
            cache.insert(user.id.clone(), user);
        }
        Ok(Self {
            dir,
            cache,
            write_lock: Mutex::new(()),
        })
    }

    async fn persist(&self, user: &User) -> StorageResult<()> {
        write_json_atomic(&self.dir, &format!("{}.json", user.id), user).await
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn get(&self, id: &str) -> StorageResult<Option<User>> {
        Ok(self.cache.get(id).map(|u| u.clone()))
    }

    async fn list(&self) -> StorageResult<Vec<User>> {
        Ok(self.cache.iter().map(|u| u.clone()).collect())
    }

    async fn create(&self, user: User) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(&user).await?;
        self.cache.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update(&self, user: User) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        if !self.cache.contains_key(&user.id) {
            return Err(StorageError::not_found("user", &user.id));
        }
        self.persist(&user).await?;
        self.cache.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update_last_seen(&self, id: &str, at: DateTime<Utc>) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut user = match self.cache.get(id) {
            Some(u) => u.clone(),
            None => return Err(StorageError::not_found("user", id)),
        };
        user.last_seen = at;
        user.updated_at = at;
        self.persist(&user).await?;
        self.cache.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> StorageResult<Option<User>> {
        Ok(self
            .cache
            .iter()
            .find(|u| tokens_match(&u.credential.token, token))
            .map(|u| u.clone()))
    }
}
